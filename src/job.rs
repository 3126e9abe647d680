/// 作业类型与设置文件映射
use std::fmt;
use std::str::FromStr;

/// 作业类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobType {
    DataExtract,
    DataLoad,
    FileDelivery,
}

impl JobType {
    /// 全部作业类型（按界面显示顺序）
    pub const ALL: [JobType; 3] = [JobType::DataExtract, JobType::DataLoad, JobType::FileDelivery];

    /// 显示名称
    pub fn label(&self) -> &'static str {
        match self {
            JobType::DataExtract => "Data Extract",
            JobType::DataLoad => "Data Load",
            JobType::FileDelivery => "File Delivery",
        }
    }

    /// 对应的设置文件名
    pub fn settings_file(&self) -> &'static str {
        match self {
            JobType::DataExtract => "data_extract_settings.json",
            JobType::DataLoad => "data_load_settings.json",
            JobType::FileDelivery => "file_delivery_settings.json",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobType::ALL
            .into_iter()
            .find(|job_type| job_type.label() == s)
            .ok_or_else(|| format!("unknown job type: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_files() {
        assert_eq!(JobType::DataExtract.settings_file(), "data_extract_settings.json");
        assert_eq!(JobType::DataLoad.settings_file(), "data_load_settings.json");
        assert_eq!(JobType::FileDelivery.settings_file(), "file_delivery_settings.json");
    }

    #[test]
    fn test_parse_label() {
        assert_eq!("Data Load".parse::<JobType>(), Ok(JobType::DataLoad));
        assert_eq!("File Delivery".parse::<JobType>(), Ok(JobType::FileDelivery));
        assert!("data load".parse::<JobType>().is_err());
        assert!("".parse::<JobType>().is_err());
    }
}
