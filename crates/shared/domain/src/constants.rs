//! String constants shared by the host, the kernel and the function slices.

/// `OpenAPI` tag for host-level endpoints.
pub const SYSTEM_TAG: &str = "System";
/// `OpenAPI` tag for function endpoints.
pub const FUNCTIONS_TAG: &str = "Functions";

/// Route prefix every HTTP-triggered function is served under.
pub const ROUTE_PREFIX: &str = "api";

/// Name of the sample HTTP-triggered function.
pub const SAMPLE_FUNCTION: &str = "SampleHttpTrigger";
/// Settings section bound into [`crate::settings::ConfigurationSettings`].
pub const SAMPLE_SECTION: &str = "MyConfigSectionPrefix";

/// Header carrying a function or master key.
pub const FUNCTION_KEY_HEADER: &str = "x-functions-key";
/// Query parameter carrying a function or master key.
pub const FUNCTION_KEY_QUERY: &str = "code";

/// Environment variable a custom-handler host uses to assign the listening port.
pub const CUSTOM_HANDLER_PORT_ENV: &str = "FUNCTIONS_CUSTOMHANDLER_PORT";
