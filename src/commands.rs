use std::path::Path;

use anyhow::{Context, Result};
use student_registry::store::DB_FILE_NAME;
use student_registry::{
    default_data_dir, Backend, Config, Course, FileStore, RecordStore, Registry, RegistryError,
    SearchHits, SearchOrder, SearchScope, SqliteStore, Student, StudentForm, Validator,
};

use crate::{Cli, Command, CourseCommand, StudentCommand, StudentEdits, StudentFields};

type DynRegistry = Registry<Box<dyn RecordStore>>;

pub(crate) fn run(cli: Cli) -> Result<()> {
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    let mut config = Config::load(&data_dir)?;
    if let Some(backend) = cli.backend {
        config = config.with_backend(backend.into());
    }

    let store = open_store(&data_dir, config.backend)?;
    let mut registry = Registry::open(store, Validator::new(config.validation))
        .context("failed to load records")?;

    match cli.command {
        Command::Student(command) => run_student(&mut registry, command),
        Command::Course(command) => run_course(&mut registry, command),
        Command::Search {
            query,
            courses,
            sort_by_id,
        } => {
            let scope = if courses {
                SearchScope::Courses
            } else {
                SearchScope::Students(order(sort_by_id))
            };
            match registry.search(&query, scope) {
                SearchHits::Students(hits) => print_students(hits),
                SearchHits::Courses(hits) => print_courses(hits),
            }
            Ok(())
        }
    }
}

fn open_store(data_dir: &Path, backend: Backend) -> Result<Box<dyn RecordStore>> {
    tracing::debug!(dir = %data_dir.display(), ?backend, "opening store");
    let store: Box<dyn RecordStore> = match backend {
        Backend::Files => Box::new(FileStore::new(data_dir)),
        Backend::Sqlite => Box::new(SqliteStore::open(&data_dir.join(DB_FILE_NAME))?),
    };
    Ok(store)
}

fn run_student(registry: &mut DynRegistry, command: StudentCommand) -> Result<()> {
    match command {
        StudentCommand::Add(fields) => {
            let student = registry.add_student(&fields.into_form())?;
            println!("Added {student}");
        }
        StudentCommand::Update { id, fields } => {
            let current = registry
                .find_student(&id)
                .ok_or_else(|| RegistryError::student_not_found(id.trim()))?;
            let form = fields.apply(StudentForm::from_student(current));
            let student = registry.update_student(&id, &form)?;
            println!("Updated {student}");
        }
        StudentCommand::Delete { id } => {
            let student = registry.delete_student(&id)?;
            println!("Deleted {student}");
        }
        StudentCommand::Show { id } => {
            let student = registry
                .find_student(&id)
                .ok_or_else(|| RegistryError::student_not_found(id.trim()))?;
            println!("{student}");
        }
        StudentCommand::List { sort_by_id } => {
            let students = match order(sort_by_id) {
                SearchOrder::ById => registry.students_sorted_by_id(),
                SearchOrder::Insertion => registry.students().collect(),
            };
            print_students(students);
        }
    }
    Ok(())
}

fn run_course(registry: &mut DynRegistry, command: CourseCommand) -> Result<()> {
    match command {
        CourseCommand::Add { code, name } => {
            let course = registry.add_course(&code, &name)?;
            println!("Added {course}");
        }
        CourseCommand::Update {
            code,
            new_code,
            name,
        } => {
            let current = registry
                .find_course(&code)
                .ok_or_else(|| RegistryError::course_not_found(code.trim().to_uppercase()))?;
            let new_code = new_code.unwrap_or_else(|| current.code.clone());
            let name = name.unwrap_or_else(|| current.name.clone());
            let change = registry.update_course(&code, &new_code, &name)?;
            println!("Updated {}", change.course);
            if change.affected_students > 0 {
                println!("Moved {} student(s) to {}", change.affected_students, change.course.code);
            }
        }
        CourseCommand::Delete { code } => {
            let change = registry.delete_course(&code)?;
            println!("Deleted {}", change.course);
            if change.affected_students > 0 {
                println!("{} student(s) no longer have a course", change.affected_students);
            }
        }
        CourseCommand::Show { code } => {
            let course = registry
                .find_course(&code)
                .ok_or_else(|| RegistryError::course_not_found(code.trim().to_uppercase()))?;
            println!("{course}");
            print_students(registry.students_in_course(&code));
        }
        CourseCommand::List => print_courses(registry.courses().collect()),
    }
    Ok(())
}

fn order(sort_by_id: bool) -> SearchOrder {
    if sort_by_id {
        SearchOrder::ById
    } else {
        SearchOrder::Insertion
    }
}

fn print_students(students: Vec<&Student>) {
    if students.is_empty() {
        println!("No students.");
    }
    for student in students {
        println!("{student}");
    }
}

fn print_courses(courses: Vec<&Course>) {
    if courses.is_empty() {
        println!("No courses.");
    }
    for course in courses {
        println!("{course}");
    }
}

impl StudentFields {
    fn into_form(self) -> StudentForm {
        StudentForm {
            id: self.id,
            first_name: self.first_name,
            middle_name: self.middle_name,
            last_name: self.last_name,
            level: self.level,
            gender: self.gender,
            course_code: self.course,
        }
    }
}

impl StudentEdits {
    /// Overlay the provided flags on a form seeded from the stored record.
    fn apply(self, mut form: StudentForm) -> StudentForm {
        if let Some(id) = self.new_id {
            form.id = id;
        }
        if let Some(first_name) = self.first_name {
            form.first_name = first_name;
        }
        if let Some(middle_name) = self.middle_name {
            form.middle_name = middle_name;
        }
        if let Some(last_name) = self.last_name {
            form.last_name = last_name;
        }
        if let Some(level) = self.level {
            form.level = level;
        }
        if let Some(gender) = self.gender {
            form.gender = gender;
        }
        if let Some(course) = self.course {
            form.course_code = course;
        }
        form
    }
}

/// Extract the message shown to the user. Registry rejections are already
/// phrased for people; anything else gets its full cause chain.
pub(crate) fn surface_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<RegistryError>() {
        Some(RegistryError::Store(_)) | None => format!("{err:#}"),
        Some(registry_err) => registry_err.to_string(),
    }
}
