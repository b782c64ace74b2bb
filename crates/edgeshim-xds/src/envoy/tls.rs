//! `envoy.extensions.transport_sockets.tls.v3`: downstream TLS termination

use super::base::DataSource;
use super::matcher::StringMatcher;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DownstreamTlsContext {
    /// Common TLS context settings.
    #[prost(message, optional, tag = "1")]
    pub common_tls_context: ::core::option::Option<CommonTlsContext>,
    /// If specified, Envoy will reject connections without a valid client
    /// certificate.
    #[prost(message, optional, tag = "2")]
    pub require_client_certificate: ::core::option::Option<bool>,
}
/// TLS context shared by both client and server TLS contexts.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommonTlsContext {
    /// Only a single TLS certificate is supported in client contexts. In server contexts,
    /// the first RSA certificate is used for clients that only support RSA and the first
    /// ECDSA certificate is used for clients that support ECDSA.
    #[prost(message, repeated, tag = "2")]
    pub tls_certificates: ::prost::alloc::vec::Vec<TlsCertificate>,
    #[prost(oneof = "common_tls_context::ValidationContextType", tags = "3")]
    pub validation_context_type: ::core::option::Option<common_tls_context::ValidationContextType>,
}
/// Nested message and enum types in `CommonTlsContext`.
pub mod common_tls_context {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ValidationContextType {
        /// How to validate peer certificates.
        #[prost(message, tag = "3")]
        ValidationContext(super::CertificateValidationContext),
    }
}
/// [#next-free-field: 18]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CertificateValidationContext {
    /// TLS certificate data containing certificate authority certificates to use in verifying
    /// a presented peer certificate.
    #[prost(message, optional, tag = "1")]
    pub trusted_ca: ::core::option::Option<DataSource>,
    /// An optional list of Subject Alternative name matchers. If specified, Envoy will verify
    /// that the Subject Alternative Name of the presented certificate matches one of the
    /// specified matchers.
    #[prost(message, repeated, tag = "15")]
    pub match_typed_subject_alt_names: ::prost::alloc::vec::Vec<SubjectAltNameMatcher>,
}
/// Matcher for subject alternative names, to match both type and value of the SAN.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubjectAltNameMatcher {
    /// Specification of type of SAN.
    #[prost(enumeration = "subject_alt_name_matcher::SanType", tag = "1")]
    pub san_type: i32,
    /// Matcher for SAN value.
    #[prost(message, optional, tag = "2")]
    pub matcher: ::core::option::Option<StringMatcher>,
}
/// Nested message and enum types in `SubjectAltNameMatcher`.
pub mod subject_alt_name_matcher {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum SanType {
        Unspecified = 0,
        Email = 1,
        Dns = 2,
        Uri = 3,
        IpAddress = 4,
        OtherName = 5,
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TlsCertificate {
    /// The TLS certificate chain.
    #[prost(message, optional, tag = "1")]
    pub certificate_chain: ::core::option::Option<DataSource>,
    /// The TLS private key.
    #[prost(message, optional, tag = "2")]
    pub private_key: ::core::option::Option<DataSource>,
}

impl DownstreamTlsContext {
    /// Single inline certificate/key pair
    pub fn inline(certificate_chain: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            common_tls_context: Some(CommonTlsContext {
                tls_certificates: vec![TlsCertificate {
                    certificate_chain: Some(DataSource::inline_string(certificate_chain)),
                    private_key: Some(DataSource::inline_string(private_key)),
                }],
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Require client certificates signed by `trusted_ca`, optionally
    /// restricted to the given subject alt names
    pub fn with_client_validation<I, S>(mut self, trusted_ca: impl Into<String>, subject_alt_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let validation = CertificateValidationContext {
            trusted_ca: Some(DataSource::inline_string(trusted_ca)),
            match_typed_subject_alt_names: subject_alt_names
                .into_iter()
                .map(|san| SubjectAltNameMatcher::exact(san.into()))
                .collect(),
        };
        self.common_tls_context
            .get_or_insert_with(Default::default)
            .validation_context_type = Some(common_tls_context::ValidationContextType::ValidationContext(validation));
        self.require_client_certificate = Some(true);
        self
    }

    /// First certificate, if any
    pub fn certificate(&self) -> Option<&TlsCertificate> {
        self.common_tls_context.as_ref()?.tls_certificates.first()
    }

    /// Client certificate validation, `None` unless mutual TLS
    pub fn validation_context(&self) -> Option<&CertificateValidationContext> {
        match self.common_tls_context.as_ref()?.validation_context_type.as_ref()? {
            common_tls_context::ValidationContextType::ValidationContext(validation) => Some(validation),
        }
    }
}

impl SubjectAltNameMatcher {
    /// Exact match on a SAN. `scheme://` values are URI SANs (SPIFFE ids),
    /// anything else a DNS name.
    pub fn exact(san: impl Into<String>) -> Self {
        let san = san.into();
        let san_type = if san.contains("://") {
            subject_alt_name_matcher::SanType::Uri
        } else {
            subject_alt_name_matcher::SanType::Dns
        };
        Self {
            san_type: san_type as i32,
            matcher: Some(StringMatcher::exact(san)),
        }
    }
}
