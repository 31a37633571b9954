mod location;
mod state;

use log::LevelFilter;
use tauri::{AppHandle, Manager, State};
use tauri_specta::{ErrorHandlingMode, collect_commands, collect_events};
use whereami_logic::RowText;

use std::result::Result as StdResult;

use crate::state::{
    AppStateHandle, RecordListUpdate, create_coordinator, permission_bootstrap, spawn_add_location,
};

type Result<T = (), E = String> = StdResult<T, E>;

#[tauri::command]
#[specta::specta]
/// Record the current location at the top of the list. Returns immediately, the list changes
/// (and a [RecordListUpdate] is sent) once the location comes in, and again once the address is
/// found. Does nothing if a location is already being fetched.
fn add_location(app: AppHandle, state: State<'_, AppStateHandle>) -> Result {
    spawn_add_location(app, state.inner().clone());
    Ok(())
}

#[tauri::command]
#[specta::specta]
/// Whether a location is currently being fetched
async fn is_locating(state: State<'_, AppStateHandle>) -> Result<bool> {
    Ok(state.is_locating().await)
}

#[tauri::command]
#[specta::specta]
/// Number of rows in the list
async fn get_record_count(state: State<'_, AppStateHandle>) -> Result<u32> {
    Ok(state.count().await as u32)
}

#[tauri::command]
#[specta::specta]
/// All rows, newest first, call after receiving a [RecordListUpdate]
async fn get_rows(state: State<'_, AppStateHandle>) -> Result<Vec<RowText>> {
    Ok(state.rows().await)
}

#[tauri::command]
#[specta::specta]
/// A single row
async fn get_row(index: u32, state: State<'_, AppStateHandle>) -> Result<RowText> {
    state
        .row_text(index as usize)
        .await
        .map_err(|err| err.to_string())
}

#[tauri::command]
#[specta::specta]
/// Delete the row at `index`, rows after it move up by one
async fn delete_record(index: u32, state: State<'_, AppStateHandle>) -> Result {
    state
        .delete_at(index as usize)
        .await
        .map(|_| ())
        .map_err(|err| err.to_string())
}

pub fn mk_specta() -> tauri_specta::Builder {
    tauri_specta::Builder::<tauri::Wry>::new()
        .error_handling(ErrorHandlingMode::Throw)
        .commands(collect_commands![
            add_location,
            is_locating,
            get_record_count,
            get_rows,
            get_row,
            delete_record,
        ])
        .events(collect_events![RecordListUpdate])
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let builder = mk_specta();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(
            tauri_plugin_log::Builder::new()
                .level(LevelFilter::Debug)
                .build(),
        )
        .plugin(tauri_plugin_geolocation::init())
        .invoke_handler(builder.invoke_handler())
        .setup(move |app| {
            builder.mount_events(app);

            let coordinator = create_coordinator(app.handle())?;
            app.manage(coordinator.clone());
            permission_bootstrap(coordinator);

            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
