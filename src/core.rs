pub mod area;
pub mod frame;
pub mod lattice;
pub mod resolution;
pub mod table;

pub use self::{
    area::{Area, Localize},
    frame::Frame,
    resolution::Resolution,
    table::{PricePoint, PriceTable, expected_length},
};
