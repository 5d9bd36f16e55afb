//! 内置 DEFAULT 规则
//! 通用 SMART 属性的默认解析方式与名称，型号规则在此基础上覆盖

use std::collections::HashMap;

use super::model::{AttrConv, DriveModel, RuleSet, DEFAULT_FAMILY};

/// (属性编号, 解析方式, 属性名称)
const DEFAULT_PRESETS: &[(&str, &str, &str)] = &[
    ("1", "Raw48", "Raw_Read_Error_Rate"),
    ("2", "Raw48", "Throughput_Performance"),
    ("3", "raw16(avg16)", "Spin_Up_Time"),
    ("4", "raw48", "Start_Stop_Count"),
    ("5", "raw16(raw16)", "Reallocated_Sector_Ct"),
    ("6", "raw48", "Read_Channel_Margin"),
    ("7", "raw48", "Seek_Error_Rate"),
    ("8", "raw48", "Seek_Time_Performance"),
    ("9", "raw24(raw8)", "Power_On_Hours"),
    ("10", "raw48", "Spin_Retry_Count"),
    ("11", "raw48", "Calibration_Retry_Count"),
    ("12", "raw48", "Power_Cycle_Count"),
    ("13", "raw48", "Read_Soft_Error_Rate"),
    ("175", "raw48", "Program_Fail_Count_Chip"),
    ("176", "raw48", "Erase_Fail_Count_Chip"),
    ("177", "raw48", "Wear_Leveling_Count"),
    ("178", "raw48", "Used_Rsvd_Blk_Cnt_Chip"),
    ("179", "raw48", "Used_Rsvd_Blk_Cnt_Tot"),
    ("180", "raw48", "Unused_Rsvd_Blk_Cnt_Tot"),
    ("181", "raw48", "Program_Fail_Cnt_Total"),
    ("182", "raw48", "Erase_Fail_Count_Total"),
    ("183", "raw48", "Runtime_Bad_Block"),
    ("184", "raw48", "End-to-End_Error"),
    ("187", "raw48", "Reported_Uncorrect"),
    ("188", "raw48", "Command_Timeout"),
    ("189", "raw48", "High_Fly_Writes"),
    ("190", "tempminmax", "Airflow_Temperature_Cel"),
    ("191", "raw48", "G-Sense_Error_Rate"),
    ("192", "raw48", "Power-Off_Retract_Count"),
    ("193", "raw48", "Load_Cycle_Count"),
    ("194", "tempminmax", "Temperature_Celsius"),
    ("195", "raw48", "Hardware_ECC_Recovered"),
    ("196", "raw16(raw16)", "Reallocated_Event_Count"),
    ("197", "raw48", "Current_Pending_Sector"),
    ("198", "raw48", "Offline_Uncorrectable"),
    ("199", "raw48", "UDMA_CRC_Error_Count"),
    ("200", "raw48", "Multi_Zone_Error_Rate"),
    ("201", "raw48", "Soft_Read_Error_Rate"),
    ("202", "raw48", "Data_Address_Mark_Errs"),
    ("203", "raw48", "Run_Out_Cancel"),
    ("204", "raw48", "Soft_ECC_Correction"),
    ("205", "raw48", "Thermal_Asperity_Rate"),
    ("206", "raw48", "Flying_Height"),
    ("207", "raw48", "Spin_High_Current"),
    ("208", "raw48", "Spin_Buzz"),
    ("209", "raw48", "Offline_Seek_Performnce"),
    ("220", "raw48", "Disk_Shift"),
    ("221", "raw48", "G-Sense_Error_Rate"),
    ("222", "raw48", "Loaded_Hours"),
    ("223", "raw48", "Load_Retry_Count"),
    ("224", "raw48", "Load_Friction"),
    ("225", "raw48", "Load_Cycle_Count"),
    ("226", "raw48", "Load-in_Time"),
    ("227", "raw48", "Torq-amp_Count"),
    ("228", "raw48", "Power-off_Retract_Count"),
    ("230", "raw48", "Head_Amplitude"),
    ("231", "raw48", "Temperature_Celsius"),
    ("232", "raw48", "Available_Reservd_Space"),
    ("233", "raw48", "Media_Wearout_Indicator"),
    ("240", "raw24(raw8)", "Head_Flying_Hours"),
    ("241", "raw48", "Total_LBAs_Written"),
    ("242", "raw48", "Total_LBAs_Read"),
    ("250", "raw48", "Read_Error_Retry_Rate"),
    ("254", "raw48", "Free_Fall_Sensor"),
];

/// 构造内置 DEFAULT 规则集
///
/// 每次调用返回一份独立的新值，调用方可以任意修改或与加载的规则集组合。
pub fn default_rule_set() -> RuleSet {
    RuleSet::new(vec![default_drive_model()])
}

/// 构造内置 DEFAULT 条目
pub fn default_drive_model() -> DriveModel {
    let presets: HashMap<String, AttrConv> = DEFAULT_PRESETS
        .iter()
        .map(|&(id, conv, name)| (id.to_string(), AttrConv::new(conv, name)))
        .collect();

    DriveModel {
        family: DEFAULT_FAMILY.to_string(),
        presets,
        ..Default::default()
    }
}
