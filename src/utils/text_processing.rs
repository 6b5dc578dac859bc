// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 文本处理模块
//!
//! 提供抓取结果入库前的文本修复功能：
//! - HTML字符引用解码
//! - XML 1.0 非法控制字符清理

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static CHARACTER_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(lt|gt|amp|quot|apos|#[0-9]+|#[xX][0-9A-Fa-f]+);")
        .expect("character reference pattern is valid")
});

/// 解码HTML字符引用
///
/// 支持五个XML预定义实体（`&lt;` `&gt;` `&amp;` `&quot;` `&apos;`）
/// 以及十进制（`&#60;`）和十六进制（`&#x3C;`）数字引用。
///
/// 单次扫描替换，`&amp;#60;` 只会被解码为 `&#60;`。
/// 无法识别的引用保持原样。
pub fn decode_html_entities(input: &str) -> String {
    CHARACTER_REFERENCE
        .replace_all(input, |caps: &Captures| {
            let reference = &caps[1];
            match reference {
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "amp" => "&".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                _ => decode_numeric_reference(reference).unwrap_or_else(|| caps[0].to_string()),
            }
        })
        .into_owned()
}

// `reference` is the part between `&` and `;`, starting with `#`.
fn decode_numeric_reference(reference: &str) -> Option<String> {
    let digits = reference.strip_prefix('#')?;
    let code_point = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    char::from_u32(code_point).map(String::from)
}

/// 判断字符在 XML 1.0 中是否为非法控制字符
///
/// 非法范围：0x00-0x08, 0x0B, 0x0C, 0x0E-0x1F。
/// 制表符(0x09)、换行符(0x0A)、回车符(0x0D)合法。
fn is_forbidden_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}')
}

/// 清理 XML 中的非法控制字符
///
/// 幂等：对已清理的文本再次调用不会产生变化。
pub fn sanitize_xml(input: &str) -> String {
    input.chars().filter(|c| !is_forbidden_control(*c)).collect()
}
