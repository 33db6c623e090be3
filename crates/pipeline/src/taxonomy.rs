//! Classification tables.
//!
//! A `Taxonomy` is immutable data handed to the classifier at construction.
//! The built-in one covers internal-medicine textbooks; a YAML file with the
//! same shape replaces it wholesale.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use texchunk_core::{AppError, AppResult};

use crate::classify::ChunkRole;

/// Classification tables for one corpus domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    /// System categories in priority order
    pub categories: Vec<CategoryRule>,

    /// Group-name patterns in priority order
    #[serde(default)]
    pub content_types: Vec<ContentTypeRule>,

    /// Chunk roles in priority order
    #[serde(default = "default_roles")]
    pub roles: Vec<RoleRule>,

    /// Entity-name patterns, tried in order
    #[serde(default = "default_entity_patterns")]
    pub entity_patterns: Vec<String>,

    /// Generic terms never accepted as an entity name
    #[serde(default = "default_entity_stop_terms")]
    pub entity_stop_terms: Vec<String>,

    /// Domain terms the keyword segmenter must keep whole
    #[serde(default = "default_dictionary")]
    pub dictionary: Vec<String>,

    /// Label for unmatched categories and content types
    #[serde(default = "default_other_label")]
    pub other_label: String,

    /// Department for unmapped categories
    #[serde(default = "default_other_department")]
    pub other_department: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub department: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTypeRule {
    pub pattern: String,
    pub label: String,
}

/// Keyword sets for one role, one per classification stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRule {
    pub role: ChunkRole,

    /// Matched against chapter title, node title and the head of the chunk
    pub keywords: Vec<String>,

    /// Matched against the node title alone
    #[serde(default)]
    pub title_keywords: Vec<String>,

    /// Matched against the first 200 characters of the chunk
    #[serde(default)]
    pub body_keywords: Vec<String>,
}

impl Taxonomy {
    /// Load a taxonomy from a YAML file.
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read taxonomy at {:?}: {}", path, e))
        })?;

        let taxonomy: Taxonomy = serde_yaml::from_str(&content).map_err(|e| {
            AppError::Config(format!("Failed to parse taxonomy at {:?}: {}", path, e))
        })?;

        taxonomy.validate()?;

        tracing::debug!(
            "Loaded taxonomy from {:?} ({} categories, {} roles)",
            path,
            taxonomy.categories.len(),
            taxonomy.roles.len()
        );
        Ok(taxonomy)
    }

    /// Reject tables the classifier cannot use.
    pub fn validate(&self) -> AppResult<()> {
        if self.categories.is_empty() {
            return Err(AppError::Config(
                "Taxonomy must declare at least one category".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if !seen.insert(category.name.as_str()) {
                return Err(AppError::Config(format!(
                    "Duplicate taxonomy category: {}",
                    category.name
                )));
            }
            if category.keywords.iter().any(|k| k.is_empty()) {
                return Err(AppError::Config(format!(
                    "Empty keyword in taxonomy category: {}",
                    category.name
                )));
            }
        }

        Ok(())
    }

    /// Every category keyword, in table order.
    pub fn category_keywords(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .flat_map(|c| c.keywords.iter().map(String::as_str))
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn category(name: &str, department: &str, keywords: &[&str]) -> CategoryRule {
    CategoryRule {
        name: name.to_string(),
        department: department.to_string(),
        keywords: strings(keywords),
    }
}

fn content_type(pattern: &str, label: &str) -> ContentTypeRule {
    ContentTypeRule {
        pattern: pattern.to_string(),
        label: label.to_string(),
    }
}

fn role(role: ChunkRole, keywords: &[&str], title: &[&str], body: &[&str]) -> RoleRule {
    RoleRule {
        role,
        keywords: strings(keywords),
        title_keywords: strings(title),
        body_keywords: strings(body),
    }
}

fn default_roles() -> Vec<RoleRule> {
    vec![
        role(
            ChunkRole::Overview,
            &["概述", "定义", "病因", "发病机制", "病理", "流行病学", "分类", "发展简史", "简史", "历史"],
            &["概述", "定义"],
            &[],
        ),
        role(
            ChunkRole::ClinicalPresentation,
            &["临床表现", "症状", "体征", "症状学", "临床特征", "临床病象", "临床特点", "症状表现"],
            &["症状", "表现"],
            &["症状", "体征"],
        ),
        role(
            ChunkRole::Diagnosis,
            &[
                "诊断", "诊断标准", "鉴别诊断", "检查", "化验", "实验室检查", "影像学", "X线", "CT",
                "MRI", "超声", "心电图", "脑电图",
            ],
            &["诊断", "鉴别"],
            &["诊断", "检查"],
        ),
        role(
            ChunkRole::Treatment,
            &[
                "治疗", "治疗方案", "治疗原则", "药物", "手术", "治疗程序", "一般治疗", "药物治疗",
                "对症治疗", "抗病毒", "抗菌", "抗生素", "介入",
            ],
            &["治疗", "方案"],
            &["治疗", "药物"],
        ),
        role(
            ChunkRole::Prognosis,
            &["预后", "疗效", "随访", "观察", "转归", "疗效观察", "疗效标准"],
            &["预后", "随访"],
            &[],
        ),
        role(
            ChunkRole::Prevention,
            &["预防", "护理", "康复", "保健", "预防措施", "护理要点"],
            &["预防", "护理"],
            &[],
        ),
    ]
}

fn default_entity_patterns() -> Vec<String> {
    strings(&[
        "急性(.+炎)",
        "慢性(.+炎)",
        "(.+)炎",
        "(.+)病",
        "(.+)综合征",
        "(.+)症",
        "(.+)衰竭",
        "(.+)梗死",
        "(.+)出血",
        "(.+)损伤",
    ])
}

fn default_entity_stop_terms() -> Vec<String> {
    strings(&["疾病", "系统", "治疗", "药物", "诊断", "概述", "原则", "方法", "指南", "学"])
}

fn default_dictionary() -> Vec<String> {
    strings(&[
        // Diseases
        "急性上呼吸道感染", "急性气管-支气管炎", "肺炎", "慢性阻塞性肺疾病", "哮喘",
        "心力衰竭", "高血压", "冠心病", "心律失常", "心肌梗死",
        "消化性溃疡", "胃炎", "肝硬化", "胰腺炎", "肝炎",
        "肾炎", "肾衰竭", "尿路感染",
        "贫血", "白血病", "淋巴瘤",
        "癫痫", "脑梗死", "脑出血", "帕金森病",
        "糖尿病", "甲状腺功能亢进", "痛风",
        "系统性红斑狼疮", "类风湿关节炎",
        // Symptoms
        "发热", "咳嗽", "胸痛", "呼吸困难", "水肿", "腹痛", "呕吐", "腹泻", "黄疸",
        // Examinations
        "血常规", "尿常规", "肝功能", "肾功能", "心电图", "X线", "CT", "MRI",
        // Drug classes
        "抗生素", "降压药", "降糖药", "利尿剂", "抗凝药",
    ])
}

fn default_other_label() -> String {
    "其他".to_string()
}

fn default_other_department() -> String {
    "其他科室".to_string()
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            categories: vec![
                category(
                    "呼吸系统疾病",
                    "呼吸内科",
                    &[
                        "呼吸", "肺", "支气管", "哮喘", "肺炎", "肺栓塞", "气胸", "胸腔积液",
                        "慢性阻塞性肺", "上呼吸道感染", "气管炎",
                    ],
                ),
                category(
                    "心血管系统疾病",
                    "心血管内科",
                    &[
                        "心血管", "心脏", "心力衰竭", "高血压", "冠心病", "心律失常", "心包", "心肌",
                        "心绞痛", "心肌梗死", "心功能",
                    ],
                ),
                category(
                    "消化系统疾病",
                    "消化内科",
                    &[
                        "消化", "胃肠", "肝", "胆", "胰腺", "腹", "呕吐", "腹泻", "黄疸", "溃疡",
                        "肝硬化", "胃炎", "肠炎",
                    ],
                ),
                category(
                    "泌尿系统疾病",
                    "肾内科",
                    &["泌尿", "肾", "尿", "膀胱", "前列腺", "肾炎", "肾衰竭", "尿路感染"],
                ),
                category(
                    "血液和造血系统疾病",
                    "血液科",
                    &["血液", "贫血", "出血", "凝血", "白血病", "淋巴瘤", "血小板", "紫癜"],
                ),
                category(
                    "神经系统疾病",
                    "神经内科",
                    &[
                        "神经", "脑", "脊髓", "癫痫", "头痛", "眩晕", "晕厥", "意识障碍", "中风",
                        "脑梗死", "脑出血", "瘫痪",
                    ],
                ),
                category(
                    "内分泌系统及代谢性疾病",
                    "内分泌科",
                    &[
                        "内分泌", "糖尿病", "甲状腺", "垂体", "肾上腺", "代谢", "痛风", "骨质疏松",
                        "血糖",
                    ],
                ),
                category(
                    "免疫性疾病",
                    "风湿免疫科",
                    &["免疫", "风湿", "红斑狼疮", "类风湿", "血管炎", "关节炎", "变态反应"],
                ),
                category(
                    "恶性肿瘤",
                    "肿瘤科",
                    &["肿瘤", "癌症", "癌", "肉瘤", "白血病", "淋巴瘤", "转移", "恶性肿瘤"],
                ),
                category(
                    "传染病",
                    "感染科",
                    &[
                        "感染", "病毒", "细菌", "结核", "肝炎", "流感", "脑膜炎", "败血症", "伤寒",
                        "痢疾", "霍乱", "鼠疫",
                    ],
                ),
                category(
                    "急诊医学",
                    "急诊科",
                    &["急诊", "危象", "休克", "中毒", "创伤", "衰竭", "危重", "抢救", "急救"],
                ),
            ],
            content_types: vec![
                content_type("内科疾病鉴别诊断学", "鉴别诊断"),
                content_type("内科治疗指南", "治疗指南"),
                content_type("临床药物治疗学", "药物治疗"),
                content_type("急诊内科学", "急诊处理"),
                content_type("病理学", "病理生理"),
            ],
            roles: default_roles(),
            entity_patterns: default_entity_patterns(),
            entity_stop_terms: default_entity_stop_terms(),
            dictionary: default_dictionary(),
            other_label: default_other_label(),
            other_department: default_other_department(),
        }
    }
}
