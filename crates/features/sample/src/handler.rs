use crate::render;
use optbind_derive::api_handler;
use optbind_domain::constants::FUNCTIONS_TAG;
use optbind_kernel::domain::settings::ConfigurationSettings;
use optbind_kernel::server::{Authorized, Options};
use tracing::info;

#[api_handler(
    method(get, post),
    path = "/api/SampleHttpTrigger",
    responses(
        (status = OK, description = "Bound settings as plain text", body = String, content_type = "text/plain"),
        (status = UNAUTHORIZED, description = "Function key missing or not accepted"),
    ),
    params(
        ("code" = Option<String>, Query, description = "Function key, alternative to the x-functions-key header"),
    ),
    tag = FUNCTIONS_TAG,
)]
pub(crate) async fn sample_http_trigger(
    _: Authorized,
    Options(settings): Options<ConfigurationSettings>,
) -> String {
    info!("HTTP trigger function processed a request.");
    render(&settings)
}
