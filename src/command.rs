//! Dashboard commands typed on stdin

use crate::error::CommandError;
use crate::types::transaction::TransactionInput;

/// One user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Classify one transaction
    Predict(TransactionInput),
    /// Classify the documented example transaction
    Example,
    /// Score 5 random held-out rows
    Batch,
    /// Start the live feed
    Start,
    /// Stop the live feed
    Stop,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  predict [key=value ...]   classify one transaction; keys: step, type, amount,
                            old_orig, new_orig, old_dest, new_dest
                            (unset keys keep the form defaults)
  predict <step> <type> <amount> <old_orig> <new_orig> <old_dest> <new_dest>
  example                   classify the example transaction
  batch                     generate predictions for 5 random transactions
  start                     start the live transaction feed
  stop                      stop the live transaction feed
  status                    show live feed state
  help                      show this help
  quit                      end the session";

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match verb.to_ascii_lowercase().as_str() {
        "predict" | "p" => Command::Predict(parse_transaction(&args)?),
        "example" => Command::Example,
        "batch" | "sample" => Command::Batch,
        "start" => Command::Start,
        "stop" => Command::Stop,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}

fn parse_transaction(args: &[&str]) -> Result<TransactionInput, CommandError> {
    let mut input = TransactionInput::default();

    if args.is_empty() {
        return Ok(input);
    }

    if args.iter().all(|a| a.contains('=')) {
        for arg in args {
            let (key, value) = arg.split_once('=').unwrap_or((*arg, ""));
            set_field(&mut input, key, value)?;
        }
        return Ok(input);
    }

    if args.len() != 7 {
        return Err(CommandError::PositionalArity(args.len()));
    }

    const ORDER: [&str; 7] = [
        "step", "type", "amount", "old_orig", "new_orig", "old_dest", "new_dest",
    ];
    for (key, value) in ORDER.iter().zip(args) {
        set_field(&mut input, key, value)?;
    }
    Ok(input)
}

fn set_field(input: &mut TransactionInput, key: &str, value: &str) -> Result<(), CommandError> {
    let invalid = || CommandError::InvalidValue {
        field: key.to_string(),
        value: value.to_string(),
    };
    let number = || value.parse::<f64>().map_err(|_| invalid());

    match key {
        "step" => input.step = value.parse().map_err(|_| invalid())?,
        // Validated by the encoder so unknown types surface as encoding errors
        "type" => input.transaction_type = value.to_string(),
        "amount" => input.amount = number()?,
        "old_orig" | "oldbalanceOrg" => input.old_balance_orig = number()?,
        "new_orig" | "newbalanceOrig" => input.new_balance_orig = number()?,
        "old_dest" | "oldbalanceDest" => input.old_balance_dest = number()?,
        "new_dest" | "newbalanceDest" => input.new_balance_dest = number()?,
        other => return Err(CommandError::UnknownField(other.to_string())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse_line("start"), Ok(Some(Command::Start)));
        assert_eq!(parse_line("  STOP "), Ok(Some(Command::Stop)));
        assert_eq!(parse_line("batch"), Ok(Some(Command::Batch)));
        assert_eq!(parse_line("exit"), Ok(Some(Command::Quit)));
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(
            parse_line("launch"),
            Err(CommandError::Unknown("launch".to_string()))
        );
    }

    #[test]
    fn test_predict_defaults() {
        assert_eq!(
            parse_line("predict"),
            Ok(Some(Command::Predict(TransactionInput::default())))
        );
    }

    #[test]
    fn test_predict_positional() {
        let command = parse_line("predict 100 TRANSFER 25000.50 30000 5000 1000 26000.50").unwrap();
        assert_eq!(command, Some(Command::Predict(TransactionInput::example())));
    }

    #[test]
    fn test_predict_key_values_override_defaults() {
        let Some(Command::Predict(input)) =
            parse_line("predict type=TRANSFER amount=25000.5 oldbalanceOrg=30000").unwrap()
        else {
            panic!("expected predict");
        };

        assert_eq!(input.transaction_type, "TRANSFER");
        assert_eq!(input.amount, 25000.5);
        assert_eq!(input.old_balance_orig, 30000.0);
        assert_eq!(input.step, 100);
        assert_eq!(input.new_balance_dest, 2000.0);
    }

    #[test]
    fn test_unknown_type_left_for_encoder() {
        let Some(Command::Predict(input)) = parse_line("predict type=BITCOIN").unwrap() else {
            panic!("expected predict");
        };
        assert_eq!(input.transaction_type, "BITCOIN");
    }

    #[test]
    fn test_predict_errors() {
        assert_eq!(
            parse_line("predict amount=lots"),
            Err(CommandError::InvalidValue {
                field: "amount".to_string(),
                value: "lots".to_string()
            })
        );
        assert_eq!(
            parse_line("predict colour=red"),
            Err(CommandError::UnknownField("colour".to_string()))
        );
        assert_eq!(
            parse_line("predict 1 TRANSFER 3"),
            Err(CommandError::PositionalArity(3))
        );
    }
}
