//! Instruction text sent alongside the two images

use crate::encode::EncodedImage;
use vqa_annotations::AnnotationRecord;

const UNKNOWN: &str = "未知";
const NO_ISSUES: &str = "无";

/// Markup every generated item must follow
const OUTPUT_FORMAT: &str = "输出格式如下：
**问题 1**： [您的问题]
**选项**：
A. [选项 A]
B. [选项 B]
C. [选项 C]
D. [选项 D]
**正确答案**： [正确选项]

**问题 2**： [您的问题]
**选项**：
A. [选项 A]
B. [选项 B]
C. [选项 C]
D. [选项 D]
**正确答案**： [正确选项]

**问题 3**： [您的问题]
**选项**：
A. [选项 A]
B. [选项 B]
C. [选项 C]
D. [选项 D]
**正确答案**： [正确选项]
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptTemplate {
    Unannotated,
    Annotated,
}

impl PromptTemplate {
    /// Annotated as soon as either image has a record
    pub fn for_annotations(a: Option<&AnnotationRecord>, b: Option<&AnnotationRecord>) -> Self {
        if a.is_some() || b.is_some() {
            PromptTemplate::Annotated
        } else {
            PromptTemplate::Unannotated
        }
    }
}

impl std::fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromptTemplate::Unannotated => f.write_str("unannotated"),
            PromptTemplate::Annotated => f.write_str("annotated"),
        }
    }
}

pub fn build_prompt(
    template: PromptTemplate,
    image_a: &EncodedImage,
    image_b: &EncodedImage,
    annotation_a: Option<&AnnotationRecord>,
    annotation_b: Option<&AnnotationRecord>,
) -> String {
    match template {
        PromptTemplate::Unannotated => unannotated_prompt(),
        PromptTemplate::Annotated => annotated_prompt(
            &ImageFacts::new(&image_a.name, annotation_a),
            &ImageFacts::new(&image_b.name, annotation_b),
        ),
    }
}

/// Annotation facts rendered for one image
struct ImageFacts<'a> {
    name: &'a str,
    count: String,
    types: String,
    collaborator: String,
    issues: String,
}

impl<'a> ImageFacts<'a> {
    fn new(name: &'a str, record: Option<&AnnotationRecord>) -> Self {
        let Some(record) = record else {
            return Self {
                name,
                count: UNKNOWN.to_string(),
                types: UNKNOWN.to_string(),
                collaborator: UNKNOWN.to_string(),
                issues: NO_ISSUES.to_string(),
            };
        };
        Self {
            name,
            count: record.object_count.to_string(),
            types: join_or(record.object_types.iter(), UNKNOWN),
            collaborator: record
                .collaborator
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
            issues: join_or(record.perception_issues.iter(), NO_ISSUES),
        }
    }
}

fn join_or<'s>(items: impl Iterator<Item = &'s String>, empty: &str) -> String {
    let joined = items.map(String::as_str).collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        empty.to_string()
    } else {
        joined
    }
}

fn unannotated_prompt() -> String {
    format!(
        "分析两张输入图片，生成三道与两张图片中车辆内容相关的单项选择视觉问答题。问题应复杂且多样化，涵盖以下类型：
1. 计数：统计两张图片中的车辆总数或某类车辆数量（如“两张图片中红色汽车的总数”）。
2. 匹配：识别图片1中的某辆车对应图片2中的哪辆车（如“图片1中的蓝色轿车对应图片2中的哪辆车”）。
3. 比较：比较两张图片中车辆的属性（如颜色、类型、数量差异）。
要求：
- 每个问题基于图片中车辆的实际内容，避免无关内容。
- 每个问题提供四个选项（A、B、C、D），选项需合理且具有区分度。
- 提供正确答案。
- 确保问题清晰、具体，避免歧义。
{OUTPUT_FORMAT}"
    )
}

fn annotated_prompt(a: &ImageFacts<'_>, b: &ImageFacts<'_>) -> String {
    format!(
        "你是一个视觉问答助手。请分析两张输入图片，生成三道与图片中车辆内容相关的单项选择视觉问答题。
以下是标注信息：
- 图片1（{a_name}）：车辆数量 {a_count}，目标类型 {a_types}，协作无人机 {a_who}，感知问题 {a_issues}。
- 图片2（{b_name}）：车辆数量 {b_count}，目标类型 {b_types}，协作无人机 {b_who}，感知问题 {b_issues}。
问题需复杂且多样化，涵盖以下类型：
1. 计数：统计两张图片中的车辆总数或某类车辆数量（例如“两张图片中车辆总数”）。
2. 匹配：识别图片1中的某辆车对应图片2中的哪辆车（例如“{a_who} 视角中的某辆车对应 {b_who} 视角中的哪辆车”）。
3. 比较：比较两张图片中车辆的属性（如数量、类型、感知问题）。
要求：
- 每个问题基于图片和标注的实际内容，确保答案准确。
- 每个问题提供四个选项（A、B、C、D），选项需合理且具有区分度。
- 提供正确答案，参考标注数据（如车辆数量和感知问题）。
- 确保问题清晰、具体，避免歧义。
{OUTPUT_FORMAT}",
        a_name = a.name,
        a_count = a.count,
        a_types = a.types,
        a_who = a.collaborator,
        a_issues = a.issues,
        b_name = b.name,
        b_count = b.count,
        b_types = b.types,
        b_who = b.collaborator,
        b_issues = b.issues,
    )
}
