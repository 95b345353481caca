use crate::board::NewBoard;
use crate::error::Result;
use dialoguer::Input;

/// Walk the user through a new board: a name, then one column label per
/// prompt until an empty entry. Returns `None` when nothing usable was given.
pub fn prompt_new_board() -> Result<Option<NewBoard>> {
    let name = Input::<String>::new()
        .with_prompt("Board name (e.g. Sales)")
        .allow_empty(true)
        .interact_text()?;
    if name.trim().is_empty() {
        println!("Cancelled.");
        return Ok(None);
    }

    let mut columns = Vec::new();
    loop {
        let prompt = if columns.is_empty() {
            "First column label (e.g. new)".to_string()
        } else {
            format!("Column {} label (empty to finish)", columns.len() + 1)
        };
        let label = Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        if label.trim().is_empty() {
            if columns.is_empty() {
                println!("A board needs at least one column.");
                continue;
            }
            break;
        }
        columns.push(label);
    }

    match NewBoard::new(&name, &columns) {
        Ok(board) => Ok(Some(board)),
        Err(e) => {
            println!("{}", e);
            Ok(None)
        }
    }
}
