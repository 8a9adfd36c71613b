pub use crate::base::{
    config::Config,
    faq::FaqIndex,
    types::{Err, Identity, Res, Void},
};
pub use anyhow::anyhow;
pub use tracing::{debug, error, info, instrument, warn};
