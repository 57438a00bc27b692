use std::fmt;

use thiserror::Error;

/// 应用程序错误类型
///
/// 每个变体对应流程中的一个阶段，只有阶段内重试耗尽后的最终错误才会出现在这里
#[derive(Debug)]
pub enum AppError {
    /// 配置错误（不会发起任何网络请求）
    Config(ConfigError),
    /// 提交报表请求失败
    Submission(SubmissionError),
    /// 轮询报表失败
    Polling(PollingError),
    /// 写入输出文件失败
    Output(OutputError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Submission(e) => write!(f, "提交错误: {}", e),
            AppError::Polling(e) => write!(f, "轮询错误: {}", e),
            AppError::Output(e) => write!(f, "输出错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(e) => Some(e),
            AppError::Submission(e) => Some(e),
            AppError::Polling(e) => Some(e),
            AppError::Output(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 配置错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 缺少组织ID
    #[error("缺少 orgid，请在配置文件中设置或设置环境变量 CUSTOMER_ORGID")]
    MissingOrgId,
    /// 缺少 Bearer Token
    #[error("缺少 bearer，请在配置文件中设置或设置环境变量 CUSTOMER_BEARER")]
    MissingBearer,
    /// 输出文件名为空
    #[error("未配置输出文件名 (output.file_name)")]
    MissingOutputFile,
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {message}")]
    ParseFailed { path: String, message: String },
    /// request_json 不是 JSON 对象
    #[error("report.request_json 不是合法的 JSON 对象: {0}")]
    InvalidRequestJson(String),
}

/// HTTP 传输层错误
///
/// 只表示"请求没有拿到响应"，拿到的任何 HTTP 响应都交给上层判断
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// 构建 HTTP 客户端失败
    #[error("HTTP 客户端初始化失败: {0}")]
    ClientBuild(String),
    /// 网络请求失败
    #[error("网络请求失败 ({url}): {message}")]
    Transport { url: String, message: String },
}

/// 单次请求尝试的失败原因
///
/// 由提交/轮询服务产生，交给重试执行器决定是否继续
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestFailure {
    #[error(transparent)]
    Api(#[from] ApiError),
    /// 非 2xx 响应
    #[error("HTTP {status} ({url}): {snippet}")]
    HttpStatus {
        url: String,
        status: u16,
        snippet: String,
    },
    /// 响应体无法解析
    #[error("响应无法解析 ({url}): {message}")]
    Undecodable { url: String, message: String },
    /// 报表尚未生成完成
    #[error("报表 {report_id} 状态为 {status}")]
    NotReady { report_id: String, status: String },
    /// 服务端返回失败标记
    #[error("报表状态为 FAILED: {reason}")]
    ReportFailed { reason: String },
    /// 成功响应中缺少报表ID
    #[error("响应中缺少报表ID: {snippet}")]
    MissingReportId { snippet: String },
}

/// 提交报表请求的最终错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("已尝试 {attempts} 次仍无法提交报表请求，最后一次错误: {last}")]
    Exhausted { attempts: u32, last: RequestFailure },
    #[error("第 {attempt} 次提交遇到不可重试的错误: {cause}")]
    Rejected { attempt: u32, cause: RequestFailure },
}

impl SubmissionError {
    pub fn attempts(&self) -> u32 {
        match self {
            SubmissionError::Exhausted { attempts, .. } => *attempts,
            SubmissionError::Rejected { attempt, .. } => *attempt,
        }
    }
}

/// 轮询报表的最终错误
///
/// 区分"报表生成失败"和"等待超时"两种结局
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollingError {
    #[error("报表生成失败 (已轮询 {attempts} 次): {reason}")]
    ReportFailed { attempts: u32, reason: String },
    #[error("已轮询 {attempts} 次报表仍未就绪，最后一次结果: {last}")]
    TimedOut { attempts: u32, last: RequestFailure },
    #[error("第 {attempt} 次轮询遇到不可重试的错误: {cause}")]
    Rejected { attempt: u32, cause: RequestFailure },
}

impl PollingError {
    pub fn attempts(&self) -> u32 {
        match self {
            PollingError::ReportFailed { attempts, .. } | PollingError::TimedOut { attempts, .. } => {
                *attempts
            }
            PollingError::Rejected { attempt, .. } => *attempt,
        }
    }
}

/// 输出文件错误
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("创建输出目录失败 ({path}): {source}")]
    CreateDirFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("删除旧文件失败 ({path}): {source}")]
    DeleteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("序列化报表内容失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ========== 从阶段错误转换 ==========

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<SubmissionError> for AppError {
    fn from(err: SubmissionError) -> Self {
        AppError::Submission(err)
    }
}

impl From<PollingError> for AppError {
    fn from(err: PollingError) -> Self {
        AppError::Polling(err)
    }
}

impl From<OutputError> for AppError {
    fn from(err: OutputError) -> Self {
        AppError::Output(err)
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        AppError::Other(err.to_string())
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
