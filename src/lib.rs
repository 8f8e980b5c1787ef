pub mod config;
pub mod error;
pub mod state;
pub mod db;

pub mod models {
    pub mod batch;
    pub mod course;
    pub mod enrollment;
    pub mod identity;
    pub mod live_session;
    pub mod subject_progress;
}

pub mod repositories {
    pub mod batch;
    pub mod course;
    pub mod enrollment;
    pub mod live_session;
    pub mod progress;
}

pub mod services {
    pub mod academics;
    pub mod eligibility;
    pub mod rotation;
    pub mod student;
}

pub mod handlers {
    pub mod academics;
    pub mod student;
}

pub mod middleware_layer {
    pub mod auth;
}

pub mod validation {
    pub mod academics;
}
