use axum_extra::headers::{self, Header, HeaderName, HeaderValue};

/// Name of the header carrying the calling service's declared name
pub const SERVICE_NAME_HEADER: &str = "service-name";

/// Name of the header carrying the calling service's signature
pub const SERVICE_SIGNATURE_HEADER: &str = "service-signature";

static SERVICE_NAME: HeaderName = HeaderName::from_static(SERVICE_NAME_HEADER);
static SERVICE_SIGNATURE: HeaderName = HeaderName::from_static(SERVICE_SIGNATURE_HEADER);

/// Stamps out a typed header holding a single, non-empty string value
macro_rules! service_header {
    ($(#[$meta:meta])* $wrapper:ident, $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq)]
        pub struct $wrapper(pub String);

        impl Header for $wrapper {
            fn name() -> &'static HeaderName {
                &$name
            }

            fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
            where
                I: Iterator<Item = &'i HeaderValue>,
            {
                let value = values
                    .next()
                    .ok_or_else(headers::Error::invalid)?
                    .to_str()
                    .map_err(|_| headers::Error::invalid())?
                    .trim();

                if value.is_empty() || values.next().is_some() {
                    return Err(headers::Error::invalid());
                }

                Ok($wrapper(value.to_owned()))
            }

            fn encode<E>(&self, values: &mut E)
            where
                E: Extend<HeaderValue>,
            {
                if let Ok(value) = HeaderValue::from_str(&self.0) {
                    values.extend(std::iter::once(value));
                }
            }
        }
    };
}

service_header!(
    /// The `service-name` header: the name a calling service declares for
    /// itself
    ServiceName,
    SERVICE_NAME
);

service_header!(
    /// The `service-signature` header: the pre-shared signature a calling
    /// service proves its name with. Never printed.
    ServiceSignature,
    SERVICE_SIGNATURE
);

impl std::fmt::Debug for ServiceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ServiceName").field(&self.0).finish()
    }
}

impl std::fmt::Debug for ServiceSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ServiceSignature").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use axum_extra::headers::{Header, HeaderValue};

    use super::{ServiceName, ServiceSignature};

    #[test]
    fn it_decodes_a_single_service_name() {
        let values = [HeaderValue::from_static("wallets")];

        let decoded = ServiceName::decode(&mut values.iter()).unwrap();

        assert_eq!(decoded, ServiceName("wallets".into()));
    }

    #[test]
    fn it_rejects_empty_or_repeated_values() {
        let empty = [HeaderValue::from_static("  ")];
        assert!(ServiceSignature::decode(&mut empty.iter()).is_err());

        let repeated = [
            HeaderValue::from_static("one"),
            HeaderValue::from_static("two"),
        ];
        assert!(ServiceSignature::decode(&mut repeated.iter()).is_err());

        let missing: [HeaderValue; 0] = [];
        assert!(ServiceName::decode(&mut missing.iter()).is_err());
    }

    #[test]
    fn it_encodes_the_value_verbatim() {
        let mut values = Vec::new();
        ServiceName("wallets".into()).encode(&mut values);

        assert_eq!(values, vec![HeaderValue::from_static("wallets")]);
    }

    #[test]
    fn it_never_prints_a_signature() {
        assert!(!format!("{:?}", ServiceSignature("sekrit".into())).contains("sekrit"));
    }
}
