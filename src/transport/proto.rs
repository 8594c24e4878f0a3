//! Wire messages for the Keto `CheckService` and the gRPC health service.
//!
//! Only the subset of `ory.keto.relation_tuples.v1alpha2` and
//! `grpc.health.v1` the gateway calls is declared here, with field numbers
//! matching the published protos.

#![allow(missing_docs)]

/// Fully qualified gRPC method path for `CheckService.Check`.
pub const CHECK_PATH: &str = "/ory.keto.relation_tuples.v1alpha2.CheckService/Check";

/// Fully qualified gRPC method path for `Health.Check`.
pub const HEALTH_CHECK_PATH: &str = "/grpc.health.v1.Health/Check";

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Subject {
    #[prost(oneof = "subject::Ref", tags = "1")]
    pub r#ref: ::core::option::Option<subject::Ref>,
}

pub mod subject {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Ref {
        #[prost(string, tag = "1")]
        Id(::prost::alloc::string::String),
    }
}

impl Subject {
    pub fn id(id: impl Into<String>) -> Self {
        Self { r#ref: Some(subject::Ref::Id(id.into())) }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CheckRequest {
    #[prost(string, tag = "1")]
    pub namespace: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub object: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub relation: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "4")]
    pub subject: ::core::option::Option<Subject>,
    #[prost(bool, tag = "5")]
    pub latest: bool,
    #[prost(string, tag = "6")]
    pub snaptoken: ::prost::alloc::string::String,
    #[prost(int32, tag = "7")]
    pub max_depth: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CheckResponse {
    #[prost(bool, tag = "1")]
    pub allowed: bool,
    #[prost(string, tag = "2")]
    pub snaptoken: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HealthCheckRequest {
    #[prost(string, tag = "1")]
    pub service: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HealthCheckResponse {
    #[prost(enumeration = "ServingStatus", tag = "1")]
    pub status: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ServingStatus {
    Unknown = 0,
    Serving = 1,
    NotServing = 2,
    ServiceUnknown = 3,
}
