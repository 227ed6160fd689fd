pub mod fudo;
