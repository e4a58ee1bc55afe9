pub mod github;

pub use github::GithubSearchClient;
