pub mod broadcast;
pub mod config;
pub mod context;
pub mod domain;
pub mod mail;
pub mod rates;
pub mod routes;
pub mod rpc;
pub mod scheduler;
pub mod startup;
pub mod storage;
pub mod subscription;
pub mod telemetry;
