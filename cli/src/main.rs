use clap::{Parser, Subcommand};
use learngrow::api::dto::courses::CourseCreate;
use learngrow::api::dto::students::{StudentCreate, StudentUpdate};
use learngrow::api::dto::submissions::SubmissionStatus;
use learngrow::api::{self, AdminApi, ApiError, StudentApi};
use learngrow::error::{AppError, AppResult};
use learngrow::session::{FileSessionStore, Role, Session, SessionStore};
use learngrow::tracker::ProgressTracker;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(about = "Console client for the Learn & Grow training platform", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "student")]
        role: String,
    },

    /// Drop the stored session
    Logout,

    /// Show the stored session
    Whoami,

    /// Manage students (admin)
    Student {
        #[command(subcommand)]
        action: StudentCommands,
    },

    /// Manage courses (admin)
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },

    /// Review submissions (admin)
    Submission {
        #[command(subcommand)]
        action: SubmissionCommands,
    },

    /// Student console: browse courses, read lessons, track progress
    Learn {
        #[command(subcommand)]
        action: LearnCommands,
    },

    /// Show or edit the student profile
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum StudentCommands {
    List,
    Show {
        id: String,
    },
    Add {
        #[arg(long)]
        username: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Course ids to assign, repeatable
        #[arg(long)]
        course: Vec<String>,
    },
    Rm {
        id: String,
    },
    ChangePassword {
        id: String,
        #[arg(long)]
        old_password: String,
        #[arg(long)]
        new_password: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    List,
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "2 Months")]
        duration: String,
        #[arg(long, default_value = "Remote")]
        mode: String,
        #[arg(long, default_value = "Core Training")]
        category: String,
        #[arg(long)]
        tool: Vec<String>,
        #[arg(long)]
        topic: Vec<String>,
        #[arg(long, default_value = "")]
        certification: String,
    },
    Rm {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SubmissionCommands {
    List,
    SetStatus {
        id: String,
        /// Pending, Reviewed, Approved or Rejected
        #[arg(long)]
        status: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum LearnCommands {
    /// List enrolled courses with progress
    Courses,
    /// Show the module/lesson tree of one course
    Course { id: String },
    /// Read a lesson (must be unlocked)
    Lesson { course: String, lesson: String },
    /// Mark a lesson complete (must be unlocked)
    Complete { course: String, lesson: String },
    /// List assignments of one course
    Assignments { course: String },
    /// Mark a module complete
    CompleteModule { course: String, order: i64 },
    /// Submit a project link for a module
    Submit {
        course: String,
        order: i64,
        #[arg(long)]
        link: String,
    },
}

#[tokio::main]
async fn main() {
    learngrow::error::run_with_error_handler(run).await;
}

async fn run() -> AppResult<()> {
    let _ = dotenvy::dotenv();
    learngrow::setup_trace();
    let args = Cli::parse();

    let store = FileSessionStore::at_default_path(cfg!(debug_assertions));

    match args.command {
        Commands::Login {
            username,
            password,
            role,
        } => {
            let gateway = learngrow::build_gateway(None).await?;
            let session =
                api::login(&gateway, &username, &password, Role::from(role.as_str())).await?;
            println!("Logged in as {} ({})", username, session.role());
            store.save(&session)?;
        }

        Commands::Logout => {
            store.clear()?;
            println!("Logged out.");
        }

        Commands::Whoami => match store.load()? {
            Some(session) => println!(
                "role: {}, user id: {}",
                session.role(),
                session.user_id().unwrap_or("-")
            ),
            None => println!("Not logged in."),
        },

        Commands::Student { action } => {
            let admin = admin_api(&store).await?;
            match action {
                StudentCommands::List => {
                    for s in admin.list_students().await? {
                        println!(
                            "{}  {}  {}  {}",
                            s.id,
                            s.username,
                            s.roll_id.as_deref().unwrap_or("-"),
                            if s.locked { "locked" } else { "active" }
                        );
                    }
                }
                StudentCommands::Show { id } => {
                    let student = admin.get_student(&id).await?;
                    println!("{:?}", student);
                }
                StudentCommands::Add {
                    username,
                    name,
                    email,
                    password,
                    course,
                } => {
                    let student = admin
                        .create_student(StudentCreate {
                            username,
                            name,
                            email,
                            password,
                            assigned_courses: course,
                        })
                        .await?;
                    println!(
                        "Student created: {} (roll {})",
                        student.username,
                        student.roll_id.as_deref().unwrap_or("-")
                    );
                }
                StudentCommands::Rm { id } => {
                    admin.delete_student(&id).await?;
                    println!("Student deleted.");
                }
                StudentCommands::ChangePassword {
                    id,
                    old_password,
                    new_password,
                } => {
                    admin
                        .change_password(&id, &old_password, &new_password)
                        .await?;
                    println!("Password changed.");
                }
            }
        }

        Commands::Course { action } => {
            let admin = admin_api(&store).await?;
            match action {
                CourseCommands::List => {
                    for c in admin.list_courses().await? {
                        println!(
                            "{}  {}  {} • {}  enrolled: {}",
                            c.id, c.title, c.duration, c.mode, c.enrolled_count
                        );
                    }
                }
                CourseCommands::Add {
                    title,
                    description,
                    duration,
                    mode,
                    category,
                    tool,
                    topic,
                    certification,
                } => {
                    let course = admin
                        .create_course(CourseCreate {
                            title,
                            description,
                            duration,
                            mode,
                            category,
                            tools: tool,
                            learn_topics: topic,
                            certification,
                        })
                        .await?;
                    println!("Course created: {} ({})", course.title, course.id);
                }
                CourseCommands::Rm { id } => {
                    admin.delete_course(&id).await?;
                    println!("Course deleted.");
                }
            }
        }

        Commands::Submission { action } => {
            let admin = admin_api(&store).await?;
            match action {
                SubmissionCommands::List => {
                    for s in admin.list_submissions().await? {
                        println!(
                            "{}  {}  {} module {}  {}  {}",
                            s.id, s.student_user_id, s.course_name, s.module_order, s.status, s.link
                        );
                    }
                }
                SubmissionCommands::SetStatus { id, status } => {
                    let status = parse_status(&status)?;
                    admin.set_submission_status(&id, status).await?;
                    println!("Submission marked as {status}.");
                }
            }
        }

        Commands::Learn { action } => {
            let (_session, student) = student_api(&store).await?;
            match action {
                LearnCommands::Courses => {
                    let list = student.my_courses().await?;
                    if !list.name.is_empty() {
                        println!("Welcome, {}", list.name);
                    }
                    for c in list.courses {
                        println!(
                            "{}  {}  {}%  assignments {}/{}",
                            c.course_id,
                            c.title,
                            c.progress_pct,
                            c.assignments.completed,
                            c.assignments.total
                        );
                    }
                }
                LearnCommands::Course { id } => {
                    let mut tracker = ProgressTracker::new(student);
                    tracker.load_course_tree(&id).await?;
                    print_tree(&tracker);
                }
                LearnCommands::Lesson { course, lesson } => {
                    let mut tracker = ProgressTracker::new(student);
                    tracker.load_course_tree(&course).await?;
                    let content = tracker.select_lesson(&lesson).await?;
                    println!("# {}", content.title);
                    if let Some(outline) = content.outline {
                        println!("\n## Outline\n{outline}");
                    }
                    match content.rephrased {
                        Some(body) => println!("\n{body}"),
                        None => println!("\nNo lesson content found."),
                    }
                }
                LearnCommands::Complete { course, lesson } => {
                    let mut tracker = ProgressTracker::new(student);
                    tracker.load_course_tree(&course).await?;
                    tracker.mark_complete(&lesson).await?;
                    println!("Lesson completed. Progress: {}%", tracker.progress_pct());
                }
                LearnCommands::Assignments { course } => {
                    for a in student.assignments(&course).await? {
                        println!(
                            "{}. {} ({})  {}  {} marks",
                            a.order,
                            a.title,
                            a.kind.as_deref().unwrap_or("mini"),
                            if a.submitted { "submitted" } else { "pending" },
                            a.marks
                        );
                    }
                }
                LearnCommands::CompleteModule { course, order } => {
                    student.complete_module(&course, order).await?;
                    println!("Module {order} completed.");
                }
                LearnCommands::Submit {
                    course,
                    order,
                    link,
                } => {
                    student.submit_project(&course, order, &link).await?;
                    println!("Project submitted for module {order}.");
                }
            }
        }

        Commands::Profile { name, email } => {
            let (session, student) = student_api(&store).await?;
            let user_id = session
                .user_id()
                .ok_or_else(|| AppError::from(ApiError::auth_rejected("session has no user id")))?
                .to_string();

            let profile = if name.is_some() || email.is_some() {
                student
                    .update_profile(&user_id, StudentUpdate { name, email })
                    .await?
            } else {
                student.profile(&user_id).await?
            };

            println!("Name:       {}", profile.name.as_deref().unwrap_or("Not set"));
            println!("Username:   {}", profile.username);
            println!("Email:      {}", profile.email.as_deref().unwrap_or("Not set"));
            println!(
                "Student ID: {}",
                profile.student_id.as_deref().unwrap_or("Not assigned")
            );
            println!(
                "Roll ID:    {}",
                profile.roll_id.as_deref().unwrap_or("Not assigned")
            );
            println!(
                "Status:     {}",
                if profile.locked { "Locked" } else { "Active" }
            );
        }
    }

    Ok(())
}

async fn admin_api(store: &FileSessionStore) -> AppResult<AdminApi> {
    let session = require_session(store)?;
    if session.role() != Role::Admin {
        return Err(ApiError::auth_rejected("admin session required").into());
    }
    let gateway = learngrow::build_gateway(Some(session)).await?;
    Ok(AdminApi::new(Arc::new(gateway)))
}

async fn student_api(store: &FileSessionStore) -> AppResult<(Session, StudentApi)> {
    let session = require_session(store)?;
    if session.role() != Role::Student {
        return Err(ApiError::auth_rejected("student session required").into());
    }
    let gateway = learngrow::build_gateway(Some(session.clone())).await?;
    Ok((session, StudentApi::new(Arc::new(gateway))))
}

fn require_session(store: &FileSessionStore) -> AppResult<Session> {
    Ok(store.load()?.ok_or(ApiError::session_required())?)
}

fn parse_status(raw: &str) -> AppResult<SubmissionStatus> {
    let status = match raw {
        "Pending" | "pending" => SubmissionStatus::Pending,
        "Reviewed" | "reviewed" => SubmissionStatus::Reviewed,
        "Approved" | "approved" => SubmissionStatus::Approved,
        "Rejected" | "rejected" => SubmissionStatus::Rejected,
        other => {
            return Err(ApiError::rejected(400, format!("unknown status: {other}")).into());
        }
    };
    Ok(status)
}

fn print_tree(tracker: &ProgressTracker) {
    let Some(tree) = tracker.tree() else {
        return;
    };

    for module in tree.modules() {
        let gate = if module.unlocked() { "" } else { " (locked)" };
        println!("Module {}: {}{}", module.order(), module.title(), gate);
        for lesson in module.lessons() {
            let mark = if lesson.completed() {
                "✓"
            } else if lesson.locked() {
                "•"
            } else {
                " "
            };
            println!("  [{}] {}  {}", mark, lesson.title(), lesson.id());
        }
    }
    println!("Progress: {}%", tracker.progress_pct());
    match tracker.current_lesson() {
        Some(lesson) => println!("Current lesson: {}", lesson.title()),
        None => println!("Current lesson: Not started"),
    }
}
