use std::{future::Future, pin::Pin, sync::Arc, thread};

use tokio::{
    runtime::Builder,
    sync::mpsc::{Receiver, Sender},
};

use crate::{
    consts::consts::PersonId,
    model::person::{NewPerson, Person},
};

use super::{PersonRepository, RepositoryError, RepositoryResult};

pub struct InsertRequest {
    pub person: NewPerson,
    pub sender: oneshot::Sender<RepositoryResult<bool>>,
}

pub struct DeleteRequest {
    pub id: PersonId,
    pub sender: oneshot::Sender<RepositoryResult<bool>>,
}

pub enum NetworkRepositoryAction {
    ListAll(oneshot::Sender<RepositoryResult<Vec<Person>>>),
    Insert(InsertRequest),
    DeleteById(DeleteRequest),
    DeleteAll(oneshot::Sender<RepositoryResult<()>>),
}

pub type TaskFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

pub type ClientFuture<C> = Pin<Box<dyn Future<Output = RepositoryResult<C>> + Send + 'static>>;

/// Synchronous face of a repository whose client lives on an async runtime thread.
///
/// Every call sends a request over the runtime's channel and blocks until the
/// completion comes back on a oneshot
pub struct NetworkRepository {
    action_sender: Sender<NetworkRepositoryAction>,
}

impl NetworkRepository {
    pub fn new(action_sender: Sender<NetworkRepositoryAction>) -> Self {
        Self { action_sender }
    }

    fn request<T>(
        &self,
        action: NetworkRepositoryAction,
        receiver: oneshot::Receiver<RepositoryResult<T>>,
    ) -> RepositoryResult<T> {
        self.action_sender.blocking_send(action).map_err(|_| {
            RepositoryError::Unavailable("repository runtime has stopped".to_string())
        })?;

        match receiver.recv() {
            Ok(result) => result,
            Err(_) => Err(RepositoryError::Unavailable(
                "repository runtime dropped the request".to_string(),
            )),
        }
    }
}

impl PersonRepository for NetworkRepository {
    fn list_all(&mut self) -> RepositoryResult<Vec<Person>> {
        let (sender, receiver) = oneshot::channel::<RepositoryResult<Vec<Person>>>();

        self.request(NetworkRepositoryAction::ListAll(sender), receiver)
    }

    fn insert(&mut self, person: &NewPerson) -> RepositoryResult<bool> {
        let (sender, receiver) = oneshot::channel::<RepositoryResult<bool>>();

        let insert_request = NetworkRepositoryAction::Insert(InsertRequest {
            person: person.clone(),
            sender,
        });

        self.request(insert_request, receiver)
    }

    fn delete_by_id(&mut self, id: PersonId) -> RepositoryResult<bool> {
        let (sender, receiver) = oneshot::channel::<RepositoryResult<bool>>();

        self.request(
            NetworkRepositoryAction::DeleteById(DeleteRequest { id, sender }),
            receiver,
        )
    }

    fn delete_all(&mut self) -> RepositoryResult<()> {
        let (sender, receiver) = oneshot::channel::<RepositoryResult<()>>();

        self.request(NetworkRepositoryAction::DeleteAll(sender), receiver)
    }
}

/// Spawns a thread running a current-thread tokio runtime that owns the client.
///
/// Returns once the client has connected, or with the connection error.
/// Requests are awaited one at a time, so they complete in the order they were sent
pub fn start_runtime<T, C>(
    thread_name: &str,
    mut action_receiver: Receiver<NetworkRepositoryAction>,
    context: T,
    task: fn(T, Arc<C>, NetworkRepositoryAction) -> TaskFuture,
    client: fn(T) -> ClientFuture<C>,
) -> RepositoryResult<()>
where
    T: Clone + Send + 'static,
    C: Send + Sync + 'static,
{
    let (ready_sender, ready_receiver) = oneshot::channel::<RepositoryResult<()>>();

    thread::Builder::new()
        .name(thread_name.to_string())
        .spawn(move || {
            let rt = match Builder::new_current_thread().enable_all().build() {
                Ok(rt) => rt,
                Err(e) => {
                    let _ = ready_sender.send(Err(RepositoryError::Io(e)));
                    return;
                }
            };

            rt.block_on(async move {
                let client = match client(context.clone()).await {
                    Ok(client) => Arc::new(client),
                    Err(e) => {
                        let _ = ready_sender.send(Err(e));
                        return;
                    }
                };

                let _ = ready_sender.send(Ok(()));

                while let Some(action) = action_receiver.recv().await {
                    task(context.clone(), client.clone(), action).await;
                }

                log::info!("Repository runtime stopped, all senders dropped");
            });
        })?;

    match ready_receiver.recv() {
        Ok(result) => result,
        Err(_) => Err(RepositoryError::Unavailable(
            "repository runtime exited before connecting".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    #[derive(Clone)]
    struct EchoEnv;

    struct EchoClient {
        rows: Vec<Person>,
    }

    fn echo_client(_env: EchoEnv) -> ClientFuture<EchoClient> {
        Box::pin(async {
            Ok(EchoClient {
                rows: vec![Person::new_test()],
            })
        })
    }

    fn failing_client(_env: EchoEnv) -> ClientFuture<EchoClient> {
        Box::pin(async { Err(RepositoryError::Connection("refused".to_string())) })
    }

    fn echo_task(_env: EchoEnv, client: Arc<EchoClient>, action: NetworkRepositoryAction) -> TaskFuture {
        Box::pin(async move {
            match action {
                NetworkRepositoryAction::ListAll(sender) => {
                    let _ = sender.send(Ok(client.rows.clone()));
                }
                NetworkRepositoryAction::Insert(request) => {
                    let _ = request.sender.send(Ok(!request.person.first_name.is_empty()));
                }
                NetworkRepositoryAction::DeleteById(request) => {
                    let _ = request.sender.send(Ok(request.id == PersonId(1)));
                }
                NetworkRepositoryAction::DeleteAll(sender) => {
                    let _ = sender.send(Err(RepositoryError::Query("denied".to_string())));
                }
            }
        })
    }

    fn echo_repository() -> NetworkRepository {
        let (action_sender, action_receiver) = mpsc::channel::<NetworkRepositoryAction>(16);

        start_runtime("Echo", action_receiver, EchoEnv, echo_task, echo_client)
            .expect("echo client always connects");

        NetworkRepository::new(action_sender)
    }

    #[test]
    fn completions_are_returned_to_the_caller() {
        let mut repository = echo_repository();

        assert_eq!(repository.list_all().unwrap(), vec![Person::new_test()]);
        assert!(repository.insert(&NewPerson::new_test()).unwrap());
        assert!(repository.delete_by_id(PersonId(1)).unwrap());
        assert!(!repository.delete_by_id(PersonId(2)).unwrap());
    }

    #[test]
    fn task_errors_are_propagated() {
        let mut repository = echo_repository();

        assert!(matches!(
            repository.delete_all(),
            Err(RepositoryError::Query(_))
        ));
    }

    #[test]
    fn connection_errors_surface_from_start_runtime() {
        let (_action_sender, action_receiver) = mpsc::channel::<NetworkRepositoryAction>(16);

        let result = start_runtime("Failing", action_receiver, EchoEnv, echo_task, failing_client);

        assert!(matches!(result, Err(RepositoryError::Connection(_))));
    }
}
