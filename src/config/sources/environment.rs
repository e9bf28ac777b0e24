//! Environment source: DRILLDOWN__SECTION__KEY, e.g. DRILLDOWN__BACKEND__ENDPOINT.

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment};

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("DRILLDOWN")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}
