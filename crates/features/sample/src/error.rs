use optbind_kernel::server::ApiStateError;
use std::borrow::Cow;

#[optbind_derive::optbind_error]
pub enum SampleError {
    #[error("Sample trigger state error{}: {source}", format_context(.context))]
    State { source: ApiStateError, context: Option<Cow<'static, str>> },
}
