/// Sources de pixels pour glyphdither : décodage d'image et redimensionnement.

pub mod image;
pub mod resize;
