// Core math: hex grid coordinates, facing, and numeric helpers

pub mod facing;
pub mod hex;
pub mod math;

pub use facing::{get_facing_direction, Facing};
pub use hex::{
    axial_to_pixel, generate_axial_coordinates, grid_size, hash_coord, parse_coord_key, AxialCoord,
    HexLayout,
};
