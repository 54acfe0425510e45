use optbind_derive::optbind_error;
use std::borrow::Cow;

#[optbind_error]
pub enum SampleError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[test]
fn optbind_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/optbind_error_pass.rs");
}

#[test]
fn source_errors_convert_and_carry_context() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let result: Result<(), std::io::Error> = Err(io);

    let err = result.context("reading settings").expect_err("should fail");
    assert!(matches!(err, SampleError::Io { .. }));
    assert_eq!(err.to_string(), "IO error (reading settings): gone");
}

#[test]
fn context_can_be_added_after_conversion() {
    let result: Result<(), SampleError> = Err("boom".into());

    let err = result.context("binding section").expect_err("should fail");
    assert_eq!(err.to_string(), "Internal error (binding section): boom");
}

#[test]
fn string_messages_map_to_internal() {
    let err = SampleError::from(String::from("dynamic"));
    assert_eq!(err.to_string(), "Internal error: dynamic");
}

mod port {
    use optbind_derive::optbind_error;
    use std::borrow::Cow;

    #[optbind_error]
    #[derive(Debug)]
    pub enum PortError {
        #[error("Invalid port{}: {source}", format_context(.context))]
        Parse {
            #[source]
            source: std::num::ParseIntError,
            context: Option<Cow<'static, str>>,
        },
    }
}

#[test]
fn existing_debug_derive_is_kept_and_marked_source_converts() {
    use port::PortErrorExt;

    let err = "70000".parse::<u16>().context("FUNCTIONS_CUSTOMHANDLER_PORT").expect_err("out of range");
    assert!(format!("{err:?}").starts_with("Parse"));
    assert_eq!(
        err.to_string(),
        "Invalid port (FUNCTIONS_CUSTOMHANDLER_PORT): number too large to fit in target type"
    );
}
