use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Public PUG REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://pubchem.ncbi.nlm.nih.gov/rest/pug";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[schemars(title = "PubChem", inline)]
#[serde(default)]
/// Where and how structures and properties are requested.
pub struct PubChemOptions {
    /// Service root; `/compound/...` paths are appended to it.
    #[schemars(title = "Base URL")]
    pub base_url: String,
    /// Overall per-request timeout in seconds.
    #[schemars(title = "Timeout (s)", range(min = 1, max = 300))]
    pub timeout_secs: u64,
    /// `User-Agent` header sent with every request.
    #[schemars(skip)]
    pub user_agent: String,
}

impl Default for PubChemOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout_secs: 30,
            user_agent: concat!("molview/", env!("CARGO_PKG_VERSION"))
                .to_owned(),
        }
    }
}
