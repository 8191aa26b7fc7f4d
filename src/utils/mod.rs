pub mod lecture_cache;
