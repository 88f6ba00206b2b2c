// Writes the outcome of a completed run to an `Output`, as a set of CSV files plus a JSON
// response document.

use crate::core::savings::{PeriodDetail, SavingsResult};
use crate::input::InstallationParameters;
use crate::output::{Output, ReportFile};
use crate::proposals::{Proposals, SystemComparison, SystemConsumption};
use crate::{ProjectFlags, SavingsResponse};
use csv::WriterBuilder;
use std::io::Write;
use tracing::{debug, instrument};

#[instrument(skip_all)]
pub fn write_report(
    output: &impl Output,
    response: &SavingsResponse,
    flags: &ProjectFlags,
) -> anyhow::Result<()> {
    if output.is_noop() {
        return Ok(());
    }

    write_parameters_file(
        output.writer_for(ReportFile::Parameters)?,
        &response.parameters,
    )?;
    write_summary_file(
        output.writer_for(ReportFile::Summary)?,
        &response.savings,
    )?;
    if flags.contains(ProjectFlags::PERIOD_DETAILS) {
        write_period_details_file(
            output.writer_for(ReportFile::PeriodDetails)?,
            &response.savings.period_details,
        )?;
    }
    if let Some(proposals) = response
        .proposals
        .as_ref()
        .filter(|_| flags.contains(ProjectFlags::PROPOSALS))
    {
        write_proposals_file(
            output.writer_for(ReportFile::Proposals)?,
            proposals,
            &response.system_comparison,
        )?;
    }
    write_response_file(output.writer_for(ReportFile::Response)?, response)?;

    debug!("Report written");
    Ok(())
}

fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

pub(crate) fn write_parameters_file(
    writer: impl Write,
    parameters: &InstallationParameters,
) -> anyhow::Result<()> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    writer.write_record(["Parameter", "Value", "Unit"])?;
    writer.write_record([
        "Project name",
        cell(parameters.project_name.as_deref()).as_str(),
        "",
    ])?;
    writer.write_record([
        "Total lights",
        cell(parameters.total_lights).as_str(),
        "[count]",
    ])?;
    writer.write_record([
        "Original wattage",
        cell(parameters.original_wattage).as_str(),
        "[W]",
    ])?;
    writer.write_record([
        "Electricity rate",
        cell(parameters.electricity_rate).as_str(),
        "[SGD/kWh]",
    ])?;
    writer.write_record([
        "Smart light high wattage",
        cell(parameters.smart_high_wattage).as_str(),
        "[W]",
    ])?;
    writer.write_record([
        "Smart light low wattage",
        cell(parameters.smart_low_wattage).as_str(),
        "[W]",
    ])?;
    writer.write_record([
        "High power ratio",
        cell(parameters.high_power_ratio).as_str(),
        "[ratio]",
    ])?;

    for (idx, period) in parameters
        .operation_schedule
        .iter()
        .flatten()
        .enumerate()
    {
        let number = idx + 1;
        writer.write_record([
            format!("Period {number} duration").as_str(),
            period.duration_hours.to_string().as_str(),
            "[hours]",
        ])?;
        writer.write_record([
            format!("Period {number} lights on").as_str(),
            period.lights_on.to_string().as_str(),
            "[count]",
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub(crate) fn write_summary_file(writer: impl Write, savings: &SavingsResult) -> anyhow::Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);

    let rows = [
        ("Daily energy savings", savings.daily_savings_kwh, "[kWh]"),
        ("Annual energy savings", savings.annual_savings_kwh, "[kWh]"),
        ("Annual cost savings", savings.annual_savings_sgd, "[SGD]"),
        (
            "Annual cost savings per light",
            savings.per_light_annual_savings,
            "[SGD]",
        ),
        ("Six year cost savings", savings.six_year_savings, "[SGD]"),
        (
            "Original daily consumption",
            savings.original_daily_consumption_kwh,
            "[kWh]",
        ),
        (
            "Smart daily consumption",
            savings.smart_daily_consumption_kwh,
            "[kWh]",
        ),
    ];

    writer.write_record(["Metric", "Value", "Unit"])?;
    for (metric, value, unit) in rows {
        writer.write_record([metric, value.to_string().as_str(), unit])?;
    }

    writer.flush()?;
    Ok(())
}

pub(crate) fn write_period_details_file(
    writer: impl Write,
    period_details: &[PeriodDetail],
) -> anyhow::Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);

    for detail in period_details {
        writer.serialize(detail)?;
    }

    writer.flush()?;
    Ok(())
}

pub(crate) fn write_proposals_file(
    writer: impl Write,
    proposals: &Proposals,
    comparison: &SystemComparison,
) -> anyhow::Result<()> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);
    let direct = &proposals.direct_purchase;
    let emc = &proposals.emc_contract;

    writer.write_record(["Section", "Item", "Value", "Unit"])?;

    let mut rows: Vec<(&str, &str, String, &str)> = vec![
        ("Direct purchase", "Light price", direct.terms.light_price.to_string(), "[SGD/light]"),
        (
            "Direct purchase",
            "Installation cost per light",
            direct.terms.installation_cost_per_light.to_string(),
            "[SGD/light]",
        ),
        ("Direct purchase", "Initial investment", direct.initial_investment.to_string(), "[SGD]"),
        (
            "Direct purchase",
            "Total installation cost",
            direct.total_installation_cost.to_string(),
            "[SGD]",
        ),
        ("Direct purchase", "Six year ROI", direct.six_year_roi.to_string(), "[SGD]"),
        ("Direct purchase", "Payback period", cell(direct.payback_years), "[years]"),
        (
            "EMC contract",
            "Client cost share",
            emc.terms.client_cost_share_percent.to_string(),
            "[%]",
        ),
        ("EMC contract", "Cost saving share", emc.cost_saving_share.to_string(), "[SGD]"),
        ("EMC contract", "Total placement fee", emc.total_placement_fee.to_string(), "[SGD]"),
        (
            "EMC contract",
            "Total installation cost",
            emc.total_installation_cost.to_string(),
            "[SGD]",
        ),
        ("EMC contract", "Total benefit", emc.total_benefit.to_string(), "[SGD]"),
    ];
    rows.extend(consumption_rows("Original system", &comparison.original));
    rows.extend(consumption_rows("Smart system", &comparison.smart));
    rows.push((
        "Comparison",
        "Six year energy savings",
        comparison.six_year_energy_savings_kwh.to_string(),
        "[kWh]",
    ));

    for (section, item, value, unit) in rows {
        writer.write_record([section, item, value.as_str(), unit])?;
    }

    writer.flush()?;
    Ok(())
}

fn consumption_rows(
    section: &'static str,
    consumption: &SystemConsumption,
) -> [(&'static str, &'static str, String, &'static str); 3] {
    [
        (section, "Daily consumption", consumption.daily_kwh.to_string(), "[kWh]"),
        (section, "Annual consumption", consumption.annual_kwh.to_string(), "[kWh]"),
        (section, "Annual cost", consumption.annual_cost.to_string(), "[SGD]"),
    ]
}

pub(crate) fn write_response_file(
    mut writer: impl Write,
    response: &SavingsResponse,
) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut writer, response)?;
    writer.flush()?;
    Ok(())
}
