//! Genre and movie catalog

pub mod genres;
pub mod models;
pub mod movies;

pub use genres::GenreService;
pub use models::{Genre, GenreRequest, MovieDetails, MovieFields, MovieUpdate, NewMovie};
pub use movies::MovieService;
