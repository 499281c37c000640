//! Database schemas for the hub
//!
//! Defines MongoDB document structures for members, the catalogs
//! (courses, events, resources, expert talks) and habits.

mod course;
mod event;
mod expert_talk;
mod habit;
mod resource;
mod user;

pub use course::{CourseDoc, COURSE_COLLECTION};
pub use event::{EventDoc, EVENT_COLLECTION};
pub use expert_talk::{ExpertTalkDoc, EXPERT_TALK_COLLECTION};
pub use habit::{HabitDoc, HabitFrequency, HABIT_COLLECTION, MAX_HABIT_PROGRESS};
pub use resource::{ResourceCategory, ResourceDoc, RESOURCE_COLLECTION};
pub use user::{
    BrainDumpEntry, EmotionalCheckin, FocusSession, PlannerEntry, PlannerStatus, UserDoc,
    UserType, USER_COLLECTION,
};
