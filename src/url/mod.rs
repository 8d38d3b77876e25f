//! URL handling for sitebound
//!
//! This module turns arbitrary user input and raw hrefs into canonical
//! absolute URLs, and decides whether a URL stays on the seed's site.

mod domain;
mod normalize;

pub use domain::{host_of, same_site};
pub use normalize::{complete_seed_url, normalize, resolve_href};
