pub mod damage;
pub mod state;
