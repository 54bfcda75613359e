// Module audio - Gestion du backend CPAL et callback temps-réel

pub mod dsp;
pub mod engine;
pub mod timing;
