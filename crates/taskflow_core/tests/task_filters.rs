use rusqlite::Connection;
use taskflow_core::db::open_db_in_memory;
use taskflow_core::model::timestamp_now;
use taskflow_core::{
    Caller, SqliteTaskRepository, SqliteUserRepository, Task, TaskListFilter, TaskPriority,
    TaskRepository, TaskService, TaskServiceError, TaskStatus, User, UserRepository,
};
use uuid::Uuid;

#[test]
fn status_filter_is_exact() {
    let conn = open_db_in_memory().unwrap();
    let caller = seed_caller(&conn, "ada@example.com");
    seed_tasks(&conn, &caller);
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let filter = TaskListFilter {
        status: Some(TaskStatus::Completed),
        ..TaskListFilter::default()
    };
    let titles = titles(service.list_tasks(&caller, &filter).unwrap());
    assert_eq!(titles, vec!["Pay rent"]);
}

#[test]
fn filters_combine_with_and() {
    let conn = open_db_in_memory().unwrap();
    let caller = seed_caller(&conn, "ada@example.com");
    seed_tasks(&conn, &caller);
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let filter = TaskListFilter {
        status: Some(TaskStatus::Pending),
        priority: Some(TaskPriority::High),
        search: Some("milk".to_string()),
    };
    let titles = titles(service.list_tasks(&caller, &filter).unwrap());
    assert_eq!(titles, vec!["Buy milk"]);

    let none = TaskListFilter {
        status: Some(TaskStatus::Completed),
        search: Some("milk".to_string()),
        ..TaskListFilter::default()
    };
    assert!(service.list_tasks(&caller, &none).unwrap().is_empty());
}

#[test]
fn search_matches_title_or_description_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let caller = seed_caller(&conn, "ada@example.com");
    seed_tasks(&conn, &caller);
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let filter = TaskListFilter {
        search: Some("LANDLORD".to_string()),
        ..TaskListFilter::default()
    };
    let titles = titles(service.list_tasks(&caller, &filter).unwrap());
    assert_eq!(titles, vec!["Pay rent"]);
}

#[test]
fn search_treats_metacharacters_literally() {
    let conn = open_db_in_memory().unwrap();
    let caller = seed_caller(&conn, "ada@example.com");
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    repo.create_task(&Task::new(caller.user_id, "Fix (urgent) bug"))
        .unwrap();
    repo.create_task(&Task::new(caller.user_id, "Fix urgent bug"))
        .unwrap();
    repo.create_task(&Task::new(caller.user_id, "Review a.b.c"))
        .unwrap();
    let service = TaskService::new(repo);

    let parens = TaskListFilter {
        search: Some("(urgent)".to_string()),
        ..TaskListFilter::default()
    };
    assert_eq!(
        titles(service.list_tasks(&caller, &parens).unwrap()),
        vec!["Fix (urgent) bug"]
    );

    let wildcard = TaskListFilter {
        search: Some(".*".to_string()),
        ..TaskListFilter::default()
    };
    assert!(service.list_tasks(&caller, &wildcard).unwrap().is_empty());
}

#[test]
fn empty_search_is_ignored() {
    let conn = open_db_in_memory().unwrap();
    let caller = seed_caller(&conn, "ada@example.com");
    seed_tasks(&conn, &caller);
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let filter = TaskListFilter {
        search: Some(String::new()),
        ..TaskListFilter::default()
    };
    assert_eq!(service.list_tasks(&caller, &filter).unwrap().len(), 3);
}

#[test]
fn oversized_search_is_a_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let caller = seed_caller(&conn, "ada@example.com");
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let filter = TaskListFilter {
        search: Some("x".repeat(201)),
        ..TaskListFilter::default()
    };
    let err = service.list_tasks(&caller, &filter).unwrap_err();
    assert!(matches!(err, TaskServiceError::Validation(_)));
}

#[test]
fn filters_never_cross_owners() {
    let conn = open_db_in_memory().unwrap();
    let ada = seed_caller(&conn, "ada@example.com");
    let bob = seed_caller(&conn, "bob@example.com");
    seed_tasks(&conn, &ada);
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let filter = TaskListFilter {
        search: Some("milk".to_string()),
        ..TaskListFilter::default()
    };
    assert!(service.list_tasks(&bob, &filter).unwrap().is_empty());
    assert!(service
        .list_tasks(&bob, &TaskListFilter::default())
        .unwrap()
        .is_empty());
}

fn seed_tasks(conn: &Connection, caller: &Caller) {
    let repo = SqliteTaskRepository::try_new(conn).unwrap();

    let mut milk = Task::new(caller.user_id, "Buy milk");
    milk.priority = TaskPriority::High;
    repo.create_task(&milk).unwrap();

    let mut rent = Task::new(caller.user_id, "Pay rent");
    rent.description = Some("Transfer to the landlord".to_string());
    rent.status = TaskStatus::Completed;
    repo.create_task(&rent).unwrap();

    let mut report = Task::new(caller.user_id, "Write report");
    report.status = TaskStatus::InProgress;
    report.priority = TaskPriority::Low;
    repo.create_task(&report).unwrap();
}

fn seed_caller(conn: &Connection, email: &str) -> Caller {
    let repo = SqliteUserRepository::try_new(conn).unwrap();
    let user = User {
        id: Uuid::new_v4(),
        name: "Test".to_string(),
        email: email.to_string(),
        created_at: timestamp_now(),
    };
    repo.create_user(&user, "unused-hash").unwrap();
    Caller::new(user.id)
}

fn titles(tasks: Vec<Task>) -> Vec<String> {
    tasks.into_iter().map(|task| task.title).collect()
}
