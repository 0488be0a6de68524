//! HTTP status codes.
//! [RFC 9110 Section 15](https://www.rfc-editor.org/rfc/rfc9110#section-15)

use std::fmt::Display;

/// HTTP status codes.
/// [RFC 9110 Section 15](https://www.rfc-editor.org/rfc/rfc9110#section-15)
///
/// A proxy forwards whatever status code the origin sends, not just the
/// codes this crate itself synthesizes for its own error responses, so
/// [`Other`](Status::Other) carries through any well-formed 3-digit code
/// this table doesn't name (e.g. 429 Too Many Requests, predating RFC 9110).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// 15.2.1
    Continue,
    /// 15.2.2
    SwitchingProtocols,
    /// 15.3.1
    r#Ok,
    /// 15.3.2
    Created,
    /// 15.3.3
    Accepted,
    /// 15.3.4
    NonAuthoritativeInformation,
    /// 15.3.5
    NoContent,
    /// 15.3.6
    ResetContent,
    /// 15.3.7
    PartialContent,
    /// 15.4.1
    MultipleChoices,
    /// 15.4.2
    MovedPermanently,
    /// 15.4.3
    Found,
    /// 15.4.4
    SeeOther,
    /// 15.4.5
    NotModified,
    /// 15.4.6
    UseProxy,
    /// 15.4.8
    TemporaryRedirect,
    /// 15.4.9
    PermanentRedirect,
    /// 15.5.1
    BadRequest,
    /// 15.5.2
    Unauthorized,
    /// 15.5.3
    PaymentRequired,
    /// 15.5.4
    Forbidden,
    /// 15.5.5
    NotFound,
    /// 15.5.6
    MethodNotAllowed,
    /// 15.5.7
    NotAcceptable,
    /// 15.5.8
    ProxyAuthenticationRequired,
    /// 15.5.9
    RequestTimeout,
    /// 15.5.10
    Conflict,
    /// 15.5.11
    Gone,
    /// 15.5.12
    LengthRequired,
    /// 15.5.13
    PreconditionFailed,
    /// 15.5.14
    ContentTooLarge,
    /// 15.5.15
    UriTooLong,
    /// 15.5.16
    UnsupportedMediaType,
    /// 15.5.17
    RangeNotSatisfiable,
    /// 15.5.18
    ExpectationFailed,
    /// 15.5.20
    MisdirectedRequest,
    /// 15.5.21
    UnprocessableContent,
    /// 15.5.22
    UpgradeRequired,
    /// 15.6.1
    InternalServerError,
    /// 15.6.2
    NotImplemented,
    /// 15.6.3
    BadGateway,
    /// 15.6.4
    ServiceUnavailable,
    /// 15.6.5
    GatewayTimeout,
    /// 15.6.6
    HttpVersionNotSupported,
    /// Any other well-formed 3-digit (100-599) code not named above.
    Other(u16),
}

impl Status {
    /// The numeric status code.
    pub fn code(&self) -> u16 {
        match self {
            Self::Continue => 100,
            Self::SwitchingProtocols => 101,
            Self::r#Ok => 200,
            Self::Created => 201,
            Self::Accepted => 202,
            Self::NonAuthoritativeInformation => 203,
            Self::NoContent => 204,
            Self::ResetContent => 205,
            Self::PartialContent => 206,
            Self::MultipleChoices => 300,
            Self::MovedPermanently => 301,
            Self::Found => 302,
            Self::SeeOther => 303,
            Self::NotModified => 304,
            Self::UseProxy => 305,
            Self::TemporaryRedirect => 307,
            Self::PermanentRedirect => 308,
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::PaymentRequired => 402,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::NotAcceptable => 406,
            Self::ProxyAuthenticationRequired => 407,
            Self::RequestTimeout => 408,
            Self::Conflict => 409,
            Self::Gone => 410,
            Self::LengthRequired => 411,
            Self::PreconditionFailed => 412,
            Self::ContentTooLarge => 413,
            Self::UriTooLong => 414,
            Self::UnsupportedMediaType => 415,
            Self::RangeNotSatisfiable => 416,
            Self::ExpectationFailed => 417,
            Self::MisdirectedRequest => 421,
            Self::UnprocessableContent => 422,
            Self::UpgradeRequired => 426,
            Self::InternalServerError => 500,
            Self::NotImplemented => 501,
            Self::BadGateway => 502,
            Self::ServiceUnavailable => 503,
            Self::GatewayTimeout => 504,
            Self::HttpVersionNotSupported => 505,
            Self::Other(code) => *code,
        }
    }

    /// The textual reason phrase conventionally paired with this code on the status line.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            Self::Continue => "Continue",
            Self::SwitchingProtocols => "Switching Protocols",
            Self::r#Ok => "OK",
            Self::Created => "Created",
            Self::Accepted => "Accepted",
            Self::NonAuthoritativeInformation => "Non-Authoritative Information",
            Self::NoContent => "No Content",
            Self::ResetContent => "Reset Content",
            Self::PartialContent => "Partial Content",
            Self::MultipleChoices => "Multiple Choices",
            Self::MovedPermanently => "Moved Permanently",
            Self::Found => "Found",
            Self::SeeOther => "See Other",
            Self::NotModified => "Not Modified",
            Self::UseProxy => "Use Proxy",
            Self::TemporaryRedirect => "Temporary Redirect",
            Self::PermanentRedirect => "Permanent Redirect",
            Self::BadRequest => "Bad Request",
            Self::Unauthorized => "Unauthorized",
            Self::PaymentRequired => "Payment Required",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::NotAcceptable => "Not Acceptable",
            Self::ProxyAuthenticationRequired => "Proxy Authentication Required",
            Self::RequestTimeout => "Request Timeout",
            Self::Conflict => "Conflict",
            Self::Gone => "Gone",
            Self::LengthRequired => "Length Required",
            Self::PreconditionFailed => "Precondition Failed",
            Self::ContentTooLarge => "Content Too Large",
            Self::UriTooLong => "URI Too Long",
            Self::UnsupportedMediaType => "Unsupported Media Type",
            Self::RangeNotSatisfiable => "Range Not Satisfiable",
            Self::ExpectationFailed => "Expectation Failed",
            Self::MisdirectedRequest => "Misdirected Request",
            Self::UnprocessableContent => "Unprocessable Content",
            Self::UpgradeRequired => "Upgrade Required",
            Self::InternalServerError => "Internal Server Error",
            Self::NotImplemented => "Not Implemented",
            Self::BadGateway => "Bad Gateway",
            Self::ServiceUnavailable => "Service Unavailable",
            Self::GatewayTimeout => "Gateway Timeout",
            Self::HttpVersionNotSupported => "HTTP Version Not Supported",
            Self::Other(_) => "Unknown",
        }
    }

    /// Parses a three-digit status code off the status line. Any code in
    /// `100..=599` parses, falling back to [`Status::Other`] when it isn't
    /// one of the named variants, so a well-formed origin response is
    /// never rejected just for using a code this table doesn't list.
    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            100 => Self::Continue,
            101 => Self::SwitchingProtocols,
            200 => Self::r#Ok,
            201 => Self::Created,
            202 => Self::Accepted,
            203 => Self::NonAuthoritativeInformation,
            204 => Self::NoContent,
            205 => Self::ResetContent,
            206 => Self::PartialContent,
            300 => Self::MultipleChoices,
            301 => Self::MovedPermanently,
            302 => Self::Found,
            303 => Self::SeeOther,
            304 => Self::NotModified,
            305 => Self::UseProxy,
            307 => Self::TemporaryRedirect,
            308 => Self::PermanentRedirect,
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            402 => Self::PaymentRequired,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            405 => Self::MethodNotAllowed,
            406 => Self::NotAcceptable,
            407 => Self::ProxyAuthenticationRequired,
            408 => Self::RequestTimeout,
            409 => Self::Conflict,
            410 => Self::Gone,
            411 => Self::LengthRequired,
            412 => Self::PreconditionFailed,
            413 => Self::ContentTooLarge,
            414 => Self::UriTooLong,
            415 => Self::UnsupportedMediaType,
            416 => Self::RangeNotSatisfiable,
            417 => Self::ExpectationFailed,
            421 => Self::MisdirectedRequest,
            422 => Self::UnprocessableContent,
            426 => Self::UpgradeRequired,
            500 => Self::InternalServerError,
            501 => Self::NotImplemented,
            502 => Self::BadGateway,
            503 => Self::ServiceUnavailable,
            504 => Self::GatewayTimeout,
            505 => Self::HttpVersionNotSupported,
            100..=599 => Self::Other(code),
            _ => return None,
        })
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}", self.code()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn from_code_round_trips_known_codes() {
        assert_eq!(Status::from_code(403), Some(Status::Forbidden));
        assert_eq!(Status::from_code(204), Some(Status::NoContent));
    }

    #[test]
    fn from_code_rejects_out_of_range() {
        assert_eq!(Status::from_code(999), None);
        assert_eq!(Status::from_code(42), None);
    }

    #[test]
    fn from_code_passes_through_unlisted_well_formed_codes() {
        assert_eq!(Status::from_code(429), Some(Status::Other(429)));
        assert_eq!(Status::from_code(451), Some(Status::Other(451)));
        assert_eq!(Status::from_code(429).unwrap().code(), 429);
    }

    #[test]
    fn code_round_trips_through_from_code() {
        for code in [100, 200, 204, 301, 404, 429, 500, 503] {
            assert_eq!(Status::from_code(code).unwrap().code(), code);
        }
    }
}
