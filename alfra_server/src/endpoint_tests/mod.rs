mod helpers;
mod mocks;

mod fudo;
mod mirror;
