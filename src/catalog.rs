//! Built-in workout template catalog.
//!
//! Templates are a read-only, slug-identified catalog compiled into the
//! binary. Importing one clones it into the user's own workout + exercises;
//! the template is never referenced again afterwards.

use crate::models::set_plan;

#[derive(Debug, Clone, Copy)]
pub struct TemplateExercise {
    pub name: &'static str,
    pub sets: i64,
    pub reps: i64,
    pub weight: f64,
    pub rest_seconds: i64,
    /// Per-set override plan, stored verbatim on the imported exercise.
    pub set_plan: Option<&'static str>,
}

#[derive(Debug, Clone, Copy)]
pub struct WorkoutTemplate {
    pub slug: &'static str,
    pub name: &'static str,
    pub muscle_groups: &'static str,
    pub exercises: &'static [TemplateExercise],
}

pub const TEMPLATES: &[WorkoutTemplate] = &[
    WorkoutTemplate {
        slug: "starting-strength-a",
        name: "Starting Strength A",
        muscle_groups: "legs, chest, back",
        exercises: &[
            TemplateExercise {
                name: "Squat",
                sets: 3,
                reps: 5,
                weight: 60.0,
                rest_seconds: 180,
                set_plan: None,
            },
            TemplateExercise {
                name: "Bench Press",
                sets: 3,
                reps: 5,
                weight: 40.0,
                rest_seconds: 180,
                set_plan: None,
            },
            TemplateExercise {
                name: "Deadlift",
                sets: 1,
                reps: 5,
                weight: 80.0,
                rest_seconds: 180,
                set_plan: None,
            },
        ],
    },
    WorkoutTemplate {
        slug: "push-pyramid",
        name: "Push Day Pyramid",
        muscle_groups: "chest, shoulders, triceps",
        exercises: &[
            TemplateExercise {
                name: "Bench Press",
                sets: 1,
                reps: 10,
                weight: 50.0,
                rest_seconds: 120,
                set_plan: Some(
                    r#"[{"set":1,"reps":12,"weight":40},{"set":2,"reps":10,"weight":50},{"set":3,"reps":8,"weight":60},{"set":4,"reps":6,"weight":65}]"#,
                ),
            },
            TemplateExercise {
                name: "Overhead Press",
                sets: 3,
                reps: 8,
                weight: 30.0,
                rest_seconds: 120,
                set_plan: None,
            },
            TemplateExercise {
                name: "Dips",
                sets: 3,
                reps: 12,
                weight: 0.0,
                rest_seconds: 90,
                set_plan: None,
            },
        ],
    },
    WorkoutTemplate {
        slug: "full-body-basics",
        name: "Full Body Basics",
        muscle_groups: "full body",
        exercises: &[
            TemplateExercise {
                name: "Goblet Squat",
                sets: 3,
                reps: 12,
                weight: 16.0,
                rest_seconds: 90,
                set_plan: None,
            },
            TemplateExercise {
                name: "Dumbbell Row",
                sets: 3,
                reps: 10,
                weight: 20.0,
                rest_seconds: 90,
                set_plan: None,
            },
            TemplateExercise {
                name: "Push-up",
                sets: 3,
                reps: 15,
                weight: 0.0,
                rest_seconds: 60,
                set_plan: None,
            },
        ],
    },
];

pub fn find_by_slug(slug: &str) -> Option<&'static WorkoutTemplate> {
    TEMPLATES.iter().find(|t| t.slug == slug)
}

/// Resolve the (sets, reps, weight) an imported exercise row gets.
///
/// A present set plan is authoritative: its length is the set count and the
/// first entry supplies the default reps/weight where defined.
pub fn resolve_import(exercise: &TemplateExercise) -> (i64, i64, f64) {
    let Some(raw) = exercise.set_plan else {
        return (exercise.sets, exercise.reps, exercise.weight);
    };
    let plan = set_plan::parse_raw(raw);
    if plan.is_empty() {
        return (exercise.sets, exercise.reps, exercise.weight);
    }

    let sets = plan.len() as i64;
    let reps = plan[0].reps.unwrap_or(exercise.reps);
    let weight = plan[0].weight.unwrap_or(exercise.weight);
    (sets, reps, weight)
}
