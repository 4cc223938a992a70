use num_format::{Locale, ToFormattedString};
use oneshot::Sender;

use super::{
    commands::{Control, DatabaseCommandResponse},
    database::Database,
};

pub enum DatabaseControlAction {
    Continue,
    Exit,
}

pub struct ControlContext<'a> {
    pub resolver: Sender<DatabaseCommandResponse>,
    pub database: &'a mut Database,
}

impl<'a> ControlContext<'a> {
    pub fn run(self, control: Control) -> DatabaseControlAction {
        match control {
            Control::Shutdown => self.shutdown(),
            Control::Reload => self.reload(),
            Control::Stats => self.database_stats(),
        }
    }

    fn send_response(self, response: DatabaseCommandResponse) {
        // The requester may have timed out and dropped its receiver
        let _ = self.resolver.send(response);
    }

    pub fn shutdown(self) -> DatabaseControlAction {
        self.send_response(DatabaseCommandResponse::control_success(
            "Successfully shutdown database",
        ));

        // As we are shutting down, we can now exit the control loop
        DatabaseControlAction::Exit
    }

    pub fn reload(self) -> DatabaseControlAction {
        let response = match self.database.load() {
            Ok(row_count) => DatabaseCommandResponse::control_success(&format!(
                "Successfully reloaded database, loaded: {} rows",
                row_count.to_formatted_string(&Locale::en)
            )),
            Err(e) => {
                log::error!("Failed to reload database: {}", e);

                DatabaseCommandResponse::control_error(&format!(
                    "Failed to reload database, previous state kept: {}",
                    e
                ))
            }
        };

        self.send_response(response);

        DatabaseControlAction::Continue
    }

    pub fn database_stats(self) -> DatabaseControlAction {
        let row_count = ("RowCount".to_string(), self.database.store.len().to_string());

        let backup_row_count = (
            "BackupRowCount".to_string(),
            self.database.store.backup_len().to_string(),
        );

        let engine = self
            .database
            .database_options
            .storage_engine
            .get_engine_info_stats();

        let info = vec![row_count, backup_row_count]
            .into_iter()
            .chain(engine)
            .collect::<Vec<(String, String)>>();

        self.send_response(DatabaseCommandResponse::control_info(info));

        DatabaseControlAction::Continue
    }
}
