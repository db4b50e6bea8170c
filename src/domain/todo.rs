use crate::domain::todo::driven_ports::{TodoReader, TodoWriter};
use crate::domain::todo::driving_ports::TodoError;
use crate::external_connections::{ExternalConnectivity, Transactable, TransactionHandle};
use anyhow::Context;
use chrono::{DateTime, Utc};
use derive_more::Display;
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A single persisted task
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to create a todo. The store assigns the ID and creation time.
#[derive(Debug, Validate, Display)]
#[display("{title}")]
#[cfg_attr(test, derive(Clone, PartialEq, Eq))]
pub struct NewTodo {
    #[validate(custom = "validate_title")]
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

/// A partial update to a todo. `None` leaves a field alone; for the description,
/// `Some(None)` clears it.
#[derive(Debug, Default, Validate)]
#[cfg_attr(test, derive(Clone, PartialEq, Eq))]
pub struct TodoPatch {
    #[validate(custom = "validate_title")]
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }

    Ok(())
}

pub mod driven_ports {
    use super::*;

    pub trait TodoReader {
        async fn all_todos(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Todo>, anyhow::Error>;
        async fn todo_by_id(
            &self,
            id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Todo>, anyhow::Error>;
    }

    pub trait TodoWriter {
        async fn create_todo(
            &self,
            new_todo: &NewTodo,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Todo, anyhow::Error>;

        /// Applies the patch and returns the updated todo, or None if no todo has the given ID
        async fn update_todo(
            &self,
            id: Uuid,
            patch: &TodoPatch,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Todo>, anyhow::Error>;

        /// Removes the todo and returns what was removed, or None if no todo has the given ID
        async fn delete_todo(
            &self,
            id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Todo>, anyhow::Error>;

        /// Removes every todo, returning how many were removed
        async fn clear_todos(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;
    use validator::ValidationErrors;

    #[derive(Debug, Error)]
    pub enum TodoError {
        #[error("input was invalid: {0}")]
        Invalid(#[from] ValidationErrors),
        #[error("todo {0} does not exist")]
        NotFound(Uuid),
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    #[cfg(test)]
    #[allow(clippy::items_after_test_module)]
    mod todo_error_clone {
        use super::TodoError;
        use anyhow::anyhow;

        impl Clone for TodoError {
            fn clone(&self) -> Self {
                match self {
                    Self::Invalid(errs) => Self::Invalid(errs.clone()),
                    Self::NotFound(id) => Self::NotFound(*id),
                    Self::PortError(err) => Self::PortError(anyhow!(format!("{}", err))),
                }
            }
        }
    }

    pub trait TodoPort {
        async fn list_todos(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
        ) -> Result<Vec<Todo>, TodoError>;
        async fn todo_by_id(
            &self,
            id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
        ) -> Result<Todo, TodoError>;
        async fn create_todo(
            &self,
            new_todo: &NewTodo,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<Todo, TodoError>;
        async fn update_todo(
            &self,
            id: Uuid,
            patch: &TodoPatch,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<Todo, TodoError>;
        async fn delete_todo(
            &self,
            id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<Todo, TodoError>;
        /// Atomically swaps the whole table's contents for the given todos
        async fn replace_all_todos(
            &self,
            todos: &[NewTodo],
            ext_cxn: &impl Transactable,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<Vec<Todo>, TodoError>;
    }
}

pub struct TodoService;

impl driving_ports::TodoPort for TodoService {
    async fn list_todos(
        &self,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl TodoReader,
    ) -> Result<Vec<Todo>, TodoError> {
        let todos = todo_read
            .all_todos(&mut *ext_cxn)
            .await
            .context("listing todos")?;

        Ok(todos)
    }

    async fn todo_by_id(
        &self,
        id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl TodoReader,
    ) -> Result<Todo, TodoError> {
        todo_read
            .todo_by_id(id, &mut *ext_cxn)
            .await
            .context("fetching a todo by id")?
            .ok_or(TodoError::NotFound(id))
    }

    async fn create_todo(
        &self,
        new_todo: &NewTodo,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_write: &impl TodoWriter,
    ) -> Result<Todo, TodoError> {
        new_todo.validate()?;
        let created = todo_write
            .create_todo(new_todo, &mut *ext_cxn)
            .await
            .context("creating a todo")?;
        info!(todo_id = %created.id, "created todo \"{new_todo}\"");

        Ok(created)
    }

    async fn update_todo(
        &self,
        id: Uuid,
        patch: &TodoPatch,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_write: &impl TodoWriter,
    ) -> Result<Todo, TodoError> {
        patch.validate()?;
        todo_write
            .update_todo(id, patch, &mut *ext_cxn)
            .await
            .context("updating a todo")?
            .ok_or(TodoError::NotFound(id))
    }

    async fn delete_todo(
        &self,
        id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_write: &impl TodoWriter,
    ) -> Result<Todo, TodoError> {
        todo_write
            .delete_todo(id, &mut *ext_cxn)
            .await
            .context("deleting a todo")?
            .ok_or(TodoError::NotFound(id))
    }

    async fn replace_all_todos(
        &self,
        todos: &[NewTodo],
        ext_cxn: &impl Transactable,
        todo_write: &impl TodoWriter,
    ) -> Result<Vec<Todo>, TodoError> {
        for new_todo in todos {
            new_todo.validate()?;
        }

        let mut txn = ext_cxn
            .start_transaction()
            .await
            .context("starting the todo replacement transaction")?;
        let removed = todo_write
            .clear_todos(&mut txn)
            .await
            .context("clearing existing todos")?;

        let mut created = Vec::with_capacity(todos.len());
        for new_todo in todos {
            let todo = todo_write
                .create_todo(new_todo, &mut txn)
                .await
                .context("inserting a replacement todo")?;
            created.push(todo);
        }

        txn.commit()
            .await
            .context("committing the todo replacement")?;
        info!(
            removed,
            inserted = created.len(),
            "replaced the contents of the todo table"
        );

        Ok(created)
    }
}


#[cfg(test)]
pub mod test_util {
    use super::*;
    use crate::domain::test_util::{Connectivity, FakeImplementation};
    use std::sync::{Mutex, RwLock};

    /// Stores todos in a Vec, mimicking the database's ID and timestamp assignment
    pub struct InMemoryTodoPersistence {
        pub todos: Vec<Todo>,
        pub connected: Connectivity,
    }

    impl InMemoryTodoPersistence {
        pub fn new() -> InMemoryTodoPersistence {
            InMemoryTodoPersistence {
                todos: Vec::new(),
                connected: Connectivity::Connected,
            }
        }

        pub fn new_with_todos(todos: &[NewTodo]) -> InMemoryTodoPersistence {
            InMemoryTodoPersistence {
                todos: todos.iter().map(todo_from_create).collect(),
                connected: Connectivity::Connected,
            }
        }

        pub fn new_locked() -> RwLock<InMemoryTodoPersistence> {
            RwLock::new(Self::new())
        }

        fn position_of(&self, id: Uuid) -> Option<usize> {
            self.todos.iter().position(|todo| todo.id == id)
        }
    }

    impl driven_ports::TodoReader for RwLock<InMemoryTodoPersistence> {
        async fn all_todos(
            &self,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Todo>, anyhow::Error> {
            let persistence = self.read().expect("todo persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            Ok(persistence.todos.clone())
        }

        async fn todo_by_id(
            &self,
            id: Uuid,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Todo>, anyhow::Error> {
            let persistence = self.read().expect("todo persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            Ok(persistence.todos.iter().find(|todo| todo.id == id).cloned())
        }
    }

    impl driven_ports::TodoWriter for RwLock<InMemoryTodoPersistence> {
        async fn create_todo(
            &self,
            new_todo: &NewTodo,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Todo, anyhow::Error> {
            let mut persistence = self.write().expect("todo persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            let todo = todo_from_create(new_todo);
            persistence.todos.push(todo.clone());
            Ok(todo)
        }

        async fn update_todo(
            &self,
            id: Uuid,
            patch: &TodoPatch,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Todo>, anyhow::Error> {
            let mut persistence = self.write().expect("todo persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            let Some(idx) = persistence.position_of(id) else {
                return Ok(None);
            };
            let todo = &mut persistence.todos[idx];
            if let Some(ref title) = patch.title {
                todo.title = title.clone();
            }
            if let Some(ref description) = patch.description {
                todo.description = description.clone();
            }
            if let Some(completed) = patch.completed {
                todo.completed = completed;
            }

            Ok(Some(todo.clone()))
        }

        async fn delete_todo(
            &self,
            id: Uuid,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Todo>, anyhow::Error> {
            let mut persistence = self.write().expect("todo persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            let removed = persistence
                .position_of(id)
                .map(|idx| persistence.todos.remove(idx));
            Ok(removed)
        }

        async fn clear_todos(
            &self,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error> {
            let mut persistence = self.write().expect("todo persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            let removed = persistence.todos.len() as u64;
            persistence.todos.clear();
            Ok(removed)
        }
    }

    pub fn todo_from_create(new_todo: &NewTodo) -> Todo {
        Todo {
            id: Uuid::new_v4(),
            title: new_todo.title.clone(),
            description: new_todo.description.clone(),
            completed: new_todo.completed,
            created_at: Utc::now(),
        }
    }

    pub struct MockTodoService {
        pub list_todos_result: FakeImplementation<(), Result<Vec<Todo>, TodoError>>,
        pub todo_by_id_result: FakeImplementation<Uuid, Result<Todo, TodoError>>,
        pub create_todo_result: FakeImplementation<NewTodo, Result<Todo, TodoError>>,
        pub update_todo_result: FakeImplementation<(Uuid, TodoPatch), Result<Todo, TodoError>>,
        pub delete_todo_result: FakeImplementation<Uuid, Result<Todo, TodoError>>,
        pub replace_all_todos_result: FakeImplementation<Vec<NewTodo>, Result<Vec<Todo>, TodoError>>,
    }

    impl MockTodoService {
        pub fn new() -> MockTodoService {
            MockTodoService {
                list_todos_result: FakeImplementation::new(),
                todo_by_id_result: FakeImplementation::new(),
                create_todo_result: FakeImplementation::new(),
                update_todo_result: FakeImplementation::new(),
                delete_todo_result: FakeImplementation::new(),
                replace_all_todos_result: FakeImplementation::new(),
            }
        }

        pub fn new_locked() -> Mutex<MockTodoService> {
            Mutex::new(Self::new())
        }
    }

    impl driving_ports::TodoPort for Mutex<MockTodoService> {
        async fn list_todos(
            &self,
            _ext_cxn: &mut impl ExternalConnectivity,
            _todo_read: &impl TodoReader,
        ) -> Result<Vec<Todo>, TodoError> {
            let mut locked_self = self.lock().expect("mock todo service mutex poisoned");
            locked_self.list_todos_result.save_arguments(());

            locked_self.list_todos_result.return_value_result()
        }

        async fn todo_by_id(
            &self,
            id: Uuid,
            _ext_cxn: &mut impl ExternalConnectivity,
            _todo_read: &impl TodoReader,
        ) -> Result<Todo, TodoError> {
            let mut locked_self = self.lock().expect("mock todo service mutex poisoned");
            locked_self.todo_by_id_result.save_arguments(id);

            locked_self.todo_by_id_result.return_value_result()
        }

        async fn create_todo(
            &self,
            new_todo: &NewTodo,
            _ext_cxn: &mut impl ExternalConnectivity,
            _todo_write: &impl TodoWriter,
        ) -> Result<Todo, TodoError> {
            let mut locked_self = self.lock().expect("mock todo service mutex poisoned");
            locked_self.create_todo_result.save_arguments(new_todo.clone());

            locked_self.create_todo_result.return_value_result()
        }

        async fn update_todo(
            &self,
            id: Uuid,
            patch: &TodoPatch,
            _ext_cxn: &mut impl ExternalConnectivity,
            _todo_write: &impl TodoWriter,
        ) -> Result<Todo, TodoError> {
            let mut locked_self = self.lock().expect("mock todo service mutex poisoned");
            locked_self
                .update_todo_result
                .save_arguments((id, patch.clone()));

            locked_self.update_todo_result.return_value_result()
        }

        async fn delete_todo(
            &self,
            id: Uuid,
            _ext_cxn: &mut impl ExternalConnectivity,
            _todo_write: &impl TodoWriter,
        ) -> Result<Todo, TodoError> {
            let mut locked_self = self.lock().expect("mock todo service mutex poisoned");
            locked_self.delete_todo_result.save_arguments(id);

            locked_self.delete_todo_result.return_value_result()
        }

        async fn replace_all_todos(
            &self,
            todos: &[NewTodo],
            _ext_cxn: &impl Transactable,
            _todo_write: &impl TodoWriter,
        ) -> Result<Vec<Todo>, TodoError> {
            let mut locked_self = self.lock().expect("mock todo service mutex poisoned");
            locked_self
                .replace_all_todos_result
                .save_arguments(todos.to_vec());

            locked_self.replace_all_todos_result.return_value_result()
        }
    }
}
