#![doc(test(attr(deny(warnings))))]

//! Form Core offers the form, field, and response primitives that power a
//! multi-page form builder and its public fill-and-submit flow.

pub mod builder;
pub mod cli;
pub mod errors;
pub mod export;
pub mod forms;
pub mod respondent;
pub mod session;
pub mod store;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        init_tracing();
        tracing::info!("Form Core tracing initialized.");
    });
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::from_default_env().add_directive("form_core=info".parse().expect("static directive"));

    fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
