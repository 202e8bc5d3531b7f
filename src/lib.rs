#![doc = include_str!("../README.md")]

pub mod api;
pub mod cache;
pub mod core;
pub mod error;
pub mod fetcher;
pub mod ops;
pub mod prelude;
pub mod reconciler;

pub use self::{
    core::{Area, PricePoint, PriceTable, expected_length},
    error::Error,
    fetcher::Fetcher,
    reconciler::{FallbackClient, PriceStore, Reconciler},
};
