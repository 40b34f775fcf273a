//! Color management: the sRGB transfer used at the frame boundary and the
//! white balance remap.

pub mod transfer;
pub mod white_balance;
