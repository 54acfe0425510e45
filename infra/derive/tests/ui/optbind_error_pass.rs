use optbind_derive::optbind_error;
use std::borrow::Cow;

#[optbind_error]
pub enum BindingError {
    #[error("Parse error{}: {source}", format_context(.context))]
    Parse {
        #[source]
        source: std::num::ParseIntError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn parse(raw: &str) -> Result<u16, BindingError> {
    raw.parse::<u16>().context("parsing port")
}

fn main() {
    let _ = parse("7071");
}
