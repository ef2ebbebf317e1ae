use std::ops::Index;

use enum_map::Enum;
use enumset::{EnumSet, EnumSetType};
use glam::Vec3;

macro_rules! impl_index_for_vec {
    { $axis_type:ident for $base_type:ident: $vector_type:ident {
        $( $axis_name:ident => $axis_field:ident, )*
    } } => {
        impl Index<$axis_type> for $vector_type {
            type Output = $base_type;

            fn index(&self, index: $axis_type) -> &Self::Output {
                match index {
                    $( $axis_type::$axis_name => &self.$axis_field, )*
                }
            }
        }
    };
    { $axis_type:ident for [
        $( $base_type:ident: $( $vector_type:ident ),* ; )*
    ] $axes:tt } => { $( $(
        impl_index_for_vec! {
            $axis_type for $base_type: $vector_type
            $axes
        }
    )* )* };
}

/// A three-dimensional axis; `X`, `Y`, or `Z`.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Enum, EnumSetType)]
#[enumset(no_super_impls)]
pub enum Axis3 {
    X,
    Y,
    Z,
}

impl_index_for_vec! {
    Axis3 for [
        f32: Vec3;
    ] {
        X => x,
        Y => y,
        Z => z,
    }
}

/// A set of three-dimensional axes.
pub type Axes3 = EnumSet<Axis3>;
