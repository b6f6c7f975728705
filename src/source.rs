//! # 结构来源
//!
//! 持有原始输入及其格式，按需解析并缓存派生结果：
//! 结构、按启用对称操作区分的渲染模型、扁平结构和 CIF 文本。
//! 解析失败不缓存，下次调用会重新解析并返回同样的错误。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `parsers/`, `render/`

use crate::error::{CifPlayerError, Result};
use crate::models::{RenderModel, Structure};
use crate::parsers::{self, cif, Format, RawInput};
use crate::render::{self, FlatStructure};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

pub struct StructureSource {
    input: RawInput,
    format: Format,
    structure: OnceLock<Structure>,
    render_models: Mutex<HashMap<Vec<String>, Arc<RenderModel>>>,
    flat: OnceLock<FlatStructure>,
    cif: OnceLock<String>,
}

impl StructureSource {
    /// 自动识别格式
    pub fn new(input: impl Into<RawInput>) -> Self {
        let input = input.into();
        let format = parsers::detect_format(&input);
        Self::with_format(input, format)
    }

    /// 使用指定格式
    pub fn with_format(input: impl Into<RawInput>, format: Format) -> Self {
        StructureSource {
            input: input.into(),
            format,
            structure: OnceLock::new(),
            render_models: Mutex::new(HashMap::new()),
            flat: OnceLock::new(),
            cif: OnceLock::new(),
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn input(&self) -> &RawInput {
        &self.input
    }

    pub fn structure(&self) -> Result<&Structure> {
        if let Some(s) = self.structure.get() {
            return Ok(s);
        }
        let parsed = parsers::parse_as(&self.input, self.format)?;
        Ok(self.structure.get_or_init(|| parsed))
    }

    /// 渲染模型，按启用的对称操作列表缓存
    pub fn render_model(&self, enabled_ops: &[String]) -> Result<Arc<RenderModel>> {
        let key = enabled_ops.to_vec();
        if let Some(model) = self.cached_model(&key) {
            return Ok(model);
        }

        let model = Arc::new(render::to_render_model(self.structure()?, enabled_ops)?);
        let mut cache = self
            .render_models
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(cache.entry(key).or_insert(model).clone())
    }

    fn cached_model(&self, key: &[String]) -> Option<Arc<RenderModel>> {
        self.render_models
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    /// 扁平结构；OPTIMADE 来源不支持
    pub fn flatten(&self) -> Result<&FlatStructure> {
        if matches!(self.format, Format::Optimade | Format::OptimadeJsonText) {
            return Err(CifPlayerError::UnsupportedOperation(
                "flatten is not available for OPTIMADE input".to_string(),
            ));
        }
        if let Some(flat) = self.flat.get() {
            return Ok(flat);
        }
        let flat = render::flatten(self.structure()?)?;
        Ok(self.flat.get_or_init(|| flat))
    }

    /// CIF 文本；CIF 输入直接返回原文
    pub fn cif(&self) -> Result<&str> {
        if let Some(text) = self.cif.get() {
            return Ok(text);
        }
        let text = match (&self.input, self.format) {
            (RawInput::Text(original), Format::Cif) => {
                // 确认原文可解析
                self.structure()?;
                original.clone()
            }
            _ => cif::to_cif_string(self.structure()?)?,
        };
        Ok(self.cif.get_or_init(|| text))
    }
}
