//! Command registry and handlers for the installment shell.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;

use crate::{
    build_info,
    form::InstallmentForm,
    messages::{format_payment_date, get_payment_message, DateFormatStyle},
    overview::{build_overview, InstallmentFilter, SortKey},
    schedule::{
        calculate_next_payment_date, solve_number_of_payments, FixedClock, PaymentFrequency,
        SystemClock,
    },
    utils::snapshot,
};

use super::core::{CommandError, CommandResult, ShellContext};
use super::output;
use super::table::{Table, TableColumn};

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            commands.insert(definition.name, definition);
        }
        Self { commands, order }
    }

    pub fn handler(&self, name: &str) -> Option<CommandHandler> {
        self.commands.get(name).map(|definition| definition.handler)
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }

    pub fn list(&self) -> impl Iterator<Item = &CommandDefinition> + '_ {
        self.order.iter().filter_map(|name| self.commands.get(name))
    }
}

pub(crate) fn registry() -> CommandRegistry {
    CommandRegistry::new(vec![
        CommandDefinition::new("help", "Show available commands", "help [command]", cmd_help),
        CommandDefinition::new(
            "today",
            "Show or pin the reference date",
            "today [YYYY-MM-DD|reset]",
            cmd_today,
        ),
        CommandDefinition::new(
            "solve",
            "Number of payments needed to repay a principal",
            "solve <total> <per-payment> [annual-rate]",
            cmd_solve,
        ),
        CommandDefinition::new(
            "next",
            "Project the next due date of a schedule",
            "next <first-date> <frequency> <made> <total-payments> [end-date]",
            cmd_next,
        ),
        CommandDefinition::new(
            "add",
            "Create an installment",
            "add <name> <total> <per-payment> <frequency> <first-date> [--rate R] [--end DATE] [--made N] [--note TEXT]",
            cmd_add,
        ),
        CommandDefinition::new(
            "list",
            "List installments with their next payment",
            "list [active|archived|all] [--sort next|urgency|name|percent]",
            cmd_list,
        ),
        CommandDefinition::new("show", "Show one installment", "show <number>", cmd_show),
        CommandDefinition::new("pay", "Record a completed payment", "pay <number>", cmd_pay),
        CommandDefinition::new(
            "edit",
            "Change a field of an installment",
            "edit <number> <name|note|total|payment|rate|frequency|first|end|made> <value>",
            cmd_edit,
        ),
        CommandDefinition::new("archive", "Archive an installment", "archive <number>", cmd_archive),
        CommandDefinition::new(
            "restore",
            "Restore an archived installment",
            "restore <number>",
            cmd_restore,
        ),
        CommandDefinition::new("remove", "Delete an installment", "remove <number>", cmd_remove),
        CommandDefinition::new("load", "Load installments from a JSON file", "load <path>", cmd_load),
        CommandDefinition::new("save", "Save installments to a JSON file", "save <path>", cmd_save),
        CommandDefinition::new(
            "config",
            "Show or change preferences",
            "config [show|set <key> <value>|save]",
            cmd_config,
        ),
        CommandDefinition::new("version", "Show build information", "version", cmd_version),
        CommandDefinition::new("exit", "Leave the shell", "exit", cmd_exit),
    ])
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        let entry = context.registry.get(&name.to_lowercase()).ok_or_else(|| {
            CommandError::InvalidArguments(format!("no help for unknown command `{name}`"))
        })?;
        output::section(format!("Help: {}", entry.name));
        output::line(format!("  {}", entry.description));
        output::line(format!("  Usage: {}", entry.usage));
        return Ok(());
    }
    output::section("Available commands");
    for entry in context.registry.list() {
        output::line(format!("  {:<10} {}", entry.name, entry.description));
    }
    output::line("Use `help <command>` for details.");
    Ok(())
}

fn cmd_today(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first() {
        None => {}
        Some(&"reset") => context.clock = Box::new(SystemClock),
        Some(raw) => context.clock = Box::new(FixedClock(parse_date(raw)?)),
    }
    output::info(format!(
        "Reference date: {}",
        format_payment_date(context.today(), DateFormatStyle::Short)
    ));
    Ok(())
}

fn cmd_solve(_context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [total, per_payment, rest @ ..] = args else {
        return Err(usage("solve <total> <per-payment> [annual-rate]"));
    };
    let rate = rest.first().map(|raw| parse_amount(raw, "rate")).transpose()?;
    let count = solve_number_of_payments(
        parse_amount(total, "total")?,
        parse_amount(per_payment, "per-payment")?,
        rate,
    )?;
    output::line(format!("Number of payments: {count}"));
    Ok(())
}

fn cmd_next(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [first, frequency, made, total, rest @ ..] = args else {
        return Err(usage(
            "next <first-date> <frequency> <made> <total-payments> [end-date]",
        ));
    };
    let end_date = rest.first().map(|raw| parse_date(raw)).transpose()?;
    let result = calculate_next_payment_date(
        parse_date(first)?,
        frequency.parse::<PaymentFrequency>()?,
        parse_count(made, "made")?,
        parse_count(total, "total-payments")?,
        end_date,
        context.today(),
    );
    let message = get_payment_message(
        result.days_until_payment,
        result.is_paid_off,
        context.messages.as_ref(),
    );
    match result.next_payment {
        Some(date) => {
            let urgency = context.config.urgency.classify(result.days_until_payment);
            output::line(format!(
                "Next payment: {} ({}) [{}]",
                format_payment_date(date, context.config.date_format),
                message,
                output::urgency_badge(Some(urgency))
            ));
        }
        None => output::line(message),
    }
    Ok(())
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (positional, flags) = split_flags(args)?;
    let [name, total, per_payment, frequency, first] = positional.as_slice() else {
        return Err(usage(
            "add <name> <total> <per-payment> <frequency> <first-date> [--rate R] [--end DATE] [--made N] [--note TEXT]",
        ));
    };

    let mut form = InstallmentForm::create();
    form.name = name.to_string();
    form.frequency = frequency.parse()?;
    form.first_payment_date = Some(parse_date(first)?);
    form.set_total_amount(Some(parse_amount(total, "total")?));
    form.set_amount_per_payment(Some(parse_amount(per_payment, "per-payment")?));
    for (flag, value) in flags {
        match flag {
            "rate" => form.set_interest_rate(Some(parse_amount(value, "rate")?)),
            "end" => form.end_date = Some(parse_date(value)?),
            "made" => form.payments_made = parse_count(value, "made")?,
            "note" => form.description = Some(value.to_string()),
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown option `--{other}`"
                )))
            }
        }
    }

    let installment = form.submit()?;
    output::success(format!(
        "Added #{} `{}` with {} {} payments.",
        context.installments.len() + 1,
        installment.name,
        installment.number_of_payments,
        installment.frequency
    ));
    context.installments.push(installment);
    Ok(())
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (positional, flags) = split_flags(args)?;
    let filter = match positional.first().copied() {
        None | Some("active") => InstallmentFilter::Active,
        Some("archived") => InstallmentFilter::Archived,
        Some("all") => InstallmentFilter::All,
        Some(other) => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown filter `{other}`; use active, archived, or all"
            )))
        }
    };
    let mut sort = SortKey::default();
    for (flag, value) in flags {
        match flag {
            "sort" => sort = value.parse()?,
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown option `--{other}`"
                )))
            }
        }
    }

    let overview = build_overview(
        &context.installments,
        filter,
        sort,
        context.today(),
        &context.config.urgency,
    );
    if overview.entries.is_empty() {
        output::info("No installments to show.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        TableColumn::right("#"),
        TableColumn::left("Name").capped(24),
        TableColumn::left("Frequency"),
        TableColumn::left("Next payment"),
        TableColumn::left("Status"),
        TableColumn::left("Urgency"),
        TableColumn::right("Paid"),
    ]);
    for entry in &overview.entries {
        let position = context
            .installments
            .iter()
            .position(|installment| installment.id == entry.id)
            .map(|idx| (idx + 1).to_string())
            .unwrap_or_default();
        let next = entry
            .next
            .next_payment
            .map(|date| format_payment_date(date, context.config.date_format))
            .unwrap_or_else(|| "-".into());
        table.push(vec![
            position,
            entry.name.clone(),
            entry.frequency.label().to_string(),
            next,
            get_payment_message(
                entry.next.days_until_payment,
                entry.next.is_paid_off,
                context.messages.as_ref(),
            ),
            output::urgency_badge(entry.urgency),
            format!(
                "{}/{} ({}%)",
                entry.progress.payments_made,
                entry.progress.number_of_payments,
                entry.percent_paid()
            ),
        ]);
    }
    output::line(table.render());
    let totals = overview.totals;
    output::line(format!(
        "{} shown, {} paid off, {} due within {} days, {:.2} outstanding",
        totals.count,
        totals.paid_off,
        totals.due_this_week,
        context.config.urgency.due_soon_days,
        totals.outstanding_amount
    ));
    Ok(())
}

fn cmd_show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let index = context.resolve_index(args.first())?;
    let installment = &context.installments[index];
    let summary = installment.summary(context.today(), &context.config.urgency);
    let style = context.config.date_format;
    let date_or_dash = |date: Option<NaiveDate>| {
        date.map(|d| format_payment_date(d, style))
            .unwrap_or_else(|| "-".into())
    };

    output::section(&installment.name);
    if let Some(note) = &installment.description {
        output::line(format!("  Note:            {note}"));
    }
    output::line(format!("  Total amount:    {:.2}", installment.total_amount));
    output::line(format!("  Per payment:     {:.2}", installment.amount_per_payment));
    if let Some(rate) = installment.interest_rate {
        output::line(format!("  Interest rate:   {rate}%"));
    }
    output::line(format!(
        "  Frequency:       {} ({} per year)",
        installment.frequency.label(),
        installment.frequency.periods_per_year()
    ));
    output::line(format!(
        "  First payment:   {}",
        format_payment_date(installment.first_payment_date, style)
    ));
    output::line(format!("  Next payment:    {}", date_or_dash(summary.next.next_payment)));
    output::line(format!("  Final payment:   {}", date_or_dash(summary.final_payment)));
    output::line(format!(
        "  Status:          {}",
        get_payment_message(
            summary.next.days_until_payment,
            summary.next.is_paid_off,
            context.messages.as_ref()
        )
    ));
    output::line(format!(
        "  Urgency:         {}",
        output::urgency_badge(summary.urgency)
    ));
    output::line(format!(
        "  Progress:        {}/{} payments ({}%)",
        summary.progress.payments_made,
        summary.progress.number_of_payments,
        summary.percent_paid()
    ));
    output::line(format!(
        "  Paid / left:     {:.2} / {:.2}",
        summary.progress.amount_paid, summary.progress.amount_remaining
    ));
    if installment.archived {
        output::line("  Archived:        yes");
    }
    Ok(())
}

fn cmd_pay(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let index = context.resolve_index(args.first())?;
    let installment = &mut context.installments[index];
    let made = installment.record_payment()?;
    output::success(format!(
        "Recorded payment {}/{} for `{}`.",
        made, installment.number_of_payments, installment.name
    ));
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [_, field, value] = args else {
        return Err(usage("edit <number> <field> <value>"));
    };
    let index = context.resolve_index(args.first())?;
    let mut form = InstallmentForm::edit(&context.installments[index]);
    let clear = matches!(*value, "none" | "-");
    match field.to_lowercase().as_str() {
        "name" => form.name = value.to_string(),
        "note" => form.description = (!clear).then(|| value.to_string()),
        "total" => form.set_total_amount(Some(parse_amount(value, "total")?)),
        "payment" => form.set_amount_per_payment(Some(parse_amount(value, "payment")?)),
        "rate" if clear => form.set_interest_rate(None),
        "rate" => form.set_interest_rate(Some(parse_amount(value, "rate")?)),
        "frequency" => form.frequency = value.parse()?,
        "first" => form.first_payment_date = Some(parse_date(value)?),
        "end" if clear => form.end_date = None,
        "end" => form.end_date = Some(parse_date(value)?),
        "made" => form.payments_made = parse_count(value, "made")?,
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown field `{other}`"
            )))
        }
    }
    let updated = form.submit()?;
    output::success(format!("Updated `{}`.", updated.name));
    context.installments[index] = updated;
    Ok(())
}

fn cmd_archive(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let index = context.resolve_index(args.first())?;
    let installment = &mut context.installments[index];
    if installment.archive() {
        output::success(format!("Archived `{}`.", installment.name));
    } else {
        output::warning(format!("`{}` is already archived.", installment.name));
    }
    Ok(())
}

fn cmd_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let index = context.resolve_index(args.first())?;
    let installment = &mut context.installments[index];
    if installment.restore() {
        output::success(format!("Restored `{}`.", installment.name));
    } else {
        output::warning(format!("`{}` is not archived.", installment.name));
    }
    Ok(())
}

fn cmd_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let index = context.resolve_index(args.first())?;
    let name = context.installments[index].name.clone();
    if !context.confirm(&format!("Delete `{name}`?"))? {
        output::info("Nothing removed.");
        return Ok(());
    }
    context.installments.remove(index);
    output::success(format!("Removed `{name}`."));
    Ok(())
}

fn cmd_load(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = args.first().ok_or_else(|| usage("load <path>"))?;
    context.installments = snapshot::load_installments(Path::new(path))?;
    output::success(format!(
        "Loaded {} installments from {}.",
        context.installments.len(),
        path
    ));
    Ok(())
}

fn cmd_save(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = args.first().ok_or_else(|| usage("save <path>"))?;
    snapshot::save_installments(&context.installments, Path::new(path))?;
    output::success(format!(
        "Saved {} installments to {}.",
        context.installments.len(),
        path
    ));
    Ok(())
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] | ["show"] => {
            let config = &context.config;
            output::section("Configuration");
            output::line(format!("  locale         {}", config.locale));
            output::line(format!("  date-format    {:?}", config.date_format).to_lowercase());
            output::line(format!("  due-soon-days  {}", config.urgency.due_soon_days));
            output::line(format!("  color          {}", config.color_enabled));
            output::line(format!(
                "  catalog        {}",
                config
                    .message_catalog
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "-".into())
            ));
            Ok(())
        }
        ["set", key, value] => {
            set_config_value(context, key, value)?;
            output::success(format!("Set {key} = {value}."));
            Ok(())
        }
        ["save"] => {
            let manager = context.config_manager.as_ref().ok_or_else(|| {
                CommandError::InvalidArguments("no configuration file in this session".into())
            })?;
            manager.save(&context.config)?;
            output::success(format!(
                "Configuration saved to {}.",
                manager.config_path().display()
            ));
            Ok(())
        }
        _ => Err(usage("config [show|set <key> <value>|save]")),
    }
}

fn set_config_value(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    match key {
        "locale" => context.config.locale = value.to_string(),
        "date-format" => {
            context.config.date_format = match value.to_lowercase().as_str() {
                "short" => DateFormatStyle::Short,
                "medium" => DateFormatStyle::Medium,
                "long" => DateFormatStyle::Long,
                other => {
                    return Err(CommandError::InvalidArguments(format!(
                        "unknown date format `{other}`; use short, medium, or long"
                    )))
                }
            }
        }
        "due-soon-days" => {
            let days: i64 = value.parse().map_err(|_| {
                CommandError::InvalidArguments(format!("`{value}` is not a number of days"))
            })?;
            if days < 1 {
                return Err(CommandError::InvalidArguments(
                    "due-soon-days must be at least 1".into(),
                ));
            }
            context.config.urgency.due_soon_days = days;
        }
        "color" => {
            context.config.color_enabled = parse_bool(value)?;
            context.apply_output_preferences();
        }
        "catalog" => {
            context.config.message_catalog =
                (!matches!(value, "none" | "-")).then(|| PathBuf::from(value));
            context.reload_messages();
        }
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown config key `{other}`"
            )))
        }
    }
    Ok(())
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::line(build_info());
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}

fn usage(text: &str) -> CommandError {
    CommandError::InvalidArguments(format!("Usage: {text}"))
}

/// Separates `--flag value` pairs from positional arguments.
fn split_flags<'a>(args: &[&'a str]) -> Result<(Vec<&'a str>, Vec<(&'a str, &'a str)>), CommandError> {
    let mut positional = Vec::new();
    let mut flags = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(flag) = arg.strip_prefix("--") {
            let value = iter.next().ok_or_else(|| {
                CommandError::InvalidArguments(format!("option `--{flag}` needs a value"))
            })?;
            flags.push((flag, *value));
        } else {
            positional.push(*arg);
        }
    }
    Ok((positional, flags))
}

fn parse_date(raw: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("`{raw}` is not a date (expected YYYY-MM-DD)"))
    })
}

fn parse_amount(raw: &str, field: &str) -> Result<f64, CommandError> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CommandError::InvalidArguments(format!("{field}: `{raw}` is not a number")))
}

fn parse_count(raw: &str, field: &str) -> Result<i32, CommandError> {
    raw.parse::<i32>().map_err(|_| {
        CommandError::InvalidArguments(format!("{field}: `{raw}` is not a whole number"))
    })
}

fn parse_bool(raw: &str) -> Result<bool, CommandError> {
    match raw.to_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => Err(CommandError::InvalidArguments(format!(
            "`{other}` is not on/off"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::core::CliMode;
    use crate::config::Config;

    fn context() -> ShellContext {
        let mut context = ShellContext::with_config(CliMode::Script, Config::default());
        context.clock = Box::new(FixedClock(NaiveDate::from_ymd_opt(2024, 11, 20).unwrap()));
        context
    }

    fn run(context: &mut ShellContext, line: &str) -> CommandResult {
        let tokens = shell_words::split(line).unwrap();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        let handler = context.registry.handler(&tokens[0]).expect("known command");
        handler(context, &args)
    }

    #[test]
    fn add_derives_count_and_edit_preserves_it() {
        let mut ctx = context();
        run(&mut ctx, "add 'Phone plan' 1200 100 monthly 2024-01-01 --made 11").unwrap();
        assert_eq!(ctx.installments.len(), 1);
        assert_eq!(ctx.installments[0].number_of_payments, 12);
        assert_eq!(ctx.installments[0].name, "Phone plan");

        run(&mut ctx, "edit 1 total 2400").unwrap();
        assert_eq!(ctx.installments[0].total_amount, 2400.0);
        assert_eq!(ctx.installments[0].number_of_payments, 12);
    }

    #[test]
    fn pay_archive_restore_remove_flow() {
        let mut ctx = context();
        run(&mut ctx, "add Sofa 300 100 weekly 2024-11-01").unwrap();
        run(&mut ctx, "pay 1").unwrap();
        assert_eq!(ctx.installments[0].payments_made, 1);

        run(&mut ctx, "archive 1").unwrap();
        assert!(ctx.installments[0].archived);
        assert!(matches!(
            run(&mut ctx, "pay 1"),
            Err(CommandError::Schedule(_))
        ));
        run(&mut ctx, "restore 1").unwrap();
        assert!(!ctx.installments[0].archived);

        run(&mut ctx, "remove 1").unwrap();
        assert!(ctx.installments.is_empty());
    }

    #[test]
    fn invalid_arguments_are_reported() {
        let mut ctx = context();
        assert!(matches!(
            run(&mut ctx, "solve 1000"),
            Err(CommandError::InvalidArguments(_))
        ));
        assert!(matches!(
            run(&mut ctx, "next 2024-01-01 yearly 0 12"),
            Err(CommandError::Schedule(_))
        ));
        assert!(matches!(
            run(&mut ctx, "pay 3"),
            Err(CommandError::InvalidArguments(_))
        ));
        assert!(matches!(
            run(&mut ctx, "add X 100 10 monthly 2024-01-01 --bogus 1"),
            Err(CommandError::InvalidArguments(_))
        ));
    }

    #[test]
    fn config_set_updates_thresholds() {
        let mut ctx = context();
        run(&mut ctx, "config set due-soon-days 3").unwrap();
        assert_eq!(ctx.config.urgency.due_soon_days, 3);
        run(&mut ctx, "config set date-format long").unwrap();
        assert_eq!(ctx.config.date_format, DateFormatStyle::Long);
        assert!(run(&mut ctx, "config set due-soon-days 0").is_err());
        assert!(run(&mut ctx, "config save").is_err());
    }

    #[test]
    fn split_flags_pairs_values() {
        let (positional, flags) = split_flags(&["a", "--rate", "5", "b"]).unwrap();
        assert_eq!(positional, vec!["a", "b"]);
        assert_eq!(flags, vec![("rate", "5")]);
        assert!(split_flags(&["--end"]).is_err());
    }
}
