//! Dense numeric kernels: matrix container, mat-mul and row-wise ops.

pub mod cpu;
pub mod matrix;
pub mod ops;

pub use cpu::{linear, mat_mul};
pub use matrix::Matrix;
pub use ops::{
    add_bias, add_in_place, argmax, gelu, layer_norm, layer_norm_row, relu, softmax,
    softmax_in_place, Activation,
};
