//! 图像采集实现
//!
//! 相机与形状识别由外部程序完成：每次采集执行一次配置的命令，
//! 标准输出最后一个非空行作为形状标签。

use anyhow::{Context, Result, bail};
use sortline_client::{ImageAcquirer, ShapeLabel};
use std::process::Command;
use tracing::{info, warn};

/// 执行外部程序完成采集
#[derive(Debug, Clone)]
pub struct CommandAcquirer {
    program: String,
    args: Vec<String>,
}

impl CommandAcquirer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// 从一行命令创建（按空白拆分，空行返回 `None`）
    ///
    /// 不做 shell 引号解析：含引号的命令行直接报错，
    /// 带空格的参数请写进配置文件的 `acquisition.args` 数组。
    pub fn from_command_line(line: &str) -> Result<Option<Self>> {
        if line.contains(['"', '\'']) {
            bail!("采集命令不支持引号: {line}（带空格的参数请写入配置 acquisition.args）");
        }
        let mut parts = line.split_whitespace().map(str::to_string);
        let Some(program) = parts.next() else {
            return Ok(None);
        };
        Ok(Some(Self::new(program, parts.collect())))
    }

    fn run(&self) -> Result<ShapeLabel> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .with_context(|| format!("无法执行采集程序: {}", self.program))?;

        if !output.status.success() {
            bail!("采集程序 {} 退出状态 {}", self.program, output.status);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let label = stdout.lines().rev().find(|line| !line.trim().is_empty()).unwrap_or("");
        Ok(label.parse::<ShapeLabel>()?)
    }
}

impl ImageAcquirer for CommandAcquirer {
    fn acquire_and_process(&mut self) -> ShapeLabel {
        match self.run() {
            Ok(label) => label,
            Err(e) => {
                warn!("Image acquisition failed: {:#}", e);
                ShapeLabel::Unknown
            },
        }
    }
}

/// 未配置采集程序时使用：只记录采集时刻
#[derive(Debug, Default)]
pub struct LoggingAcquirer {
    count: u64,
}

impl ImageAcquirer for LoggingAcquirer {
    fn acquire_and_process(&mut self) -> ShapeLabel {
        self.count += 1;
        info!("Acquisition #{} (no image pipeline configured)", self.count);
        ShapeLabel::Unknown
    }
}
