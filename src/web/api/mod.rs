pub mod czml;
