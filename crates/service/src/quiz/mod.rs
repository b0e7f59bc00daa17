//! Quiz store: submission, active-window lookup, result release and listing.

pub mod domain;
pub mod repository;
pub mod service;
pub mod window;

pub use domain::{NewQuiz, NewQuizInput, Quiz, QuizDocument};
pub use repository::QuizRepository;
pub use service::QuizService;
